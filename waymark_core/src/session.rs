//! The session controller: event choreography between the collaborators,
//! the workout store, and persistence.
//!
//! All handlers run to completion on a single thread; the host calls an
//! `on_*` method whenever one of its external events fires. The only state
//! besides the store is the pending map click, alive between a click and
//! the matching form submit.

use crate::{
    history, validate, Coords, Error, ListEntry, MarkerStyle, RawFields, Snapshot, Workout,
    WorkoutKind, WorkoutStore,
};
use crate::view::{FormView, ListView, MapView, PENDING_MARKER_CAPTION};

/// Result of a form submission, surfaced to the user by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Workout recorded; carries the new id.
    Recorded(String),
    /// Validation failed; nothing changed and the form stays open.
    Rejected,
    /// No pending map click, so the submit was not trusted.
    Ignored,
}

/// Stateful orchestrator over injected map/form/list collaborators and a
/// snapshot slot.
pub struct Session<M, F, L, S> {
    map: M,
    form: F,
    list: L,
    slot: S,
    store: WorkoutStore,
    pending_click: Option<Coords>,
    persist_error: Option<Error>,
    default_zoom: u8,
}

impl<M, F, L, S> Session<M, F, L, S>
where
    M: MapView,
    F: FormView,
    L: ListView,
    S: Snapshot,
{
    /// Hydrate the store from the snapshot slot and replay the persisted
    /// history as list entries. Map markers replay later, once the map has
    /// a position to render at.
    pub fn new(map: M, form: F, mut list: L, slot: S, default_zoom: u8) -> Self {
        let mut store = WorkoutStore::new();
        store.load_records(history::load(&slot));

        for workout in store.iter() {
            list.push_entry(ListEntry::from(workout));
        }

        Self {
            map,
            form,
            list,
            slot,
            store,
            pending_click: None,
            persist_error: None,
            default_zoom,
        }
    }

    /// Geolocation fix arrived: render the map there and replay every
    /// stored workout as a labeled marker. This is the only place the
    /// persisted history reappears on the map.
    pub fn on_geolocation_ready(&mut self, coords: Coords) {
        self.map.render(coords, self.default_zoom);

        for workout in self.store.iter() {
            let caption = popup_caption(workout);
            self.map
                .place_marker(workout.coords(), &caption, MarkerStyle::Kind(workout.kind()));
        }
    }

    /// Geolocation denied or unavailable. The host surfaces the notice;
    /// the map never initializes and the core stays inert.
    pub fn on_geolocation_failed(&mut self) {
        tracing::warn!("Geolocation unavailable; map not initialized");
    }

    /// Map clicked: remember the location and open the form. A new click
    /// overwrites any earlier unanswered one.
    pub fn on_map_clicked(&mut self, coords: Coords) {
        self.pending_click = Some(coords);
        self.form.show();
        self.form.focus_first_field();
        self.map
            .place_marker(coords, PENDING_MARKER_CAPTION, MarkerStyle::Pending);
    }

    /// Workout kind selector changed: swap the cadence/elevation rows.
    pub fn on_kind_changed(&mut self) {
        self.form.toggle_cadence_elevation();
    }

    /// Form submitted. Requires a pending map click; validates the raw
    /// fields, then records the workout, emits render requests, and
    /// persists the store fire-and-forget.
    pub fn on_form_submitted(&mut self, fields: &RawFields) -> SubmitOutcome {
        let coords = match self.pending_click {
            Some(coords) => coords,
            None => {
                tracing::debug!("Form submit without a map click; ignoring");
                return SubmitOutcome::Ignored;
            }
        };

        let kind = match WorkoutKind::from_str(fields.kind.trim()) {
            Some(kind) => kind,
            None => {
                tracing::debug!(kind = %fields.kind, "Unknown workout kind");
                return SubmitOutcome::Rejected;
            }
        };

        if !validate::fields_are_valid(
            kind,
            &fields.distance,
            &fields.duration,
            &fields.cadence,
            &fields.elevation,
        ) {
            tracing::debug!("Workout fields failed validation");
            return SubmitOutcome::Rejected;
        }

        // Checked fields parse after validation; the unchecked one falls
        // back to 0, matching an empty form row.
        let distance = parse_or_zero(&fields.distance);
        let duration = parse_or_zero(&fields.duration);
        let workout = match kind {
            WorkoutKind::Running => {
                Workout::running(coords, distance, duration, parse_or_zero(&fields.cadence))
            }
            WorkoutKind::Cycling => {
                Workout::cycling(coords, distance, duration, parse_or_zero(&fields.elevation))
            }
        };
        let id = workout.id().to_string();

        let caption = popup_caption(&workout);
        self.map
            .place_marker(workout.coords(), &caption, MarkerStyle::Kind(kind));
        self.list.push_entry(ListEntry::from(&workout));
        self.store.add(workout);

        // Fire-and-forget: the in-memory store stays authoritative; a failed
        // write is recorded for the host to inspect, not retried.
        if let Err(e) = history::save(&mut self.slot, &self.store) {
            tracing::warn!("Failed to persist workout history: {}", e);
            self.persist_error = Some(e);
        }

        self.pending_click = None;
        self.form.hide();

        tracing::info!(%id, kind = kind.as_str(), "Recorded workout");
        SubmitOutcome::Recorded(id)
    }

    /// List entry activated: pan the map to that workout. A stale id is a
    /// silent no-op.
    pub fn on_list_item_activated(&mut self, id: &str) {
        match self.store.find_by_id(id) {
            Some(workout) => {
                let coords = workout.coords();
                self.map.pan_to(coords, self.default_zoom);
            }
            None => tracing::debug!(%id, "List activation for unknown workout id"),
        }
    }

    /// Whether a map click is awaiting its form submit.
    pub fn awaiting_input(&self) -> bool {
        self.pending_click.is_some()
    }

    pub fn store(&self) -> &WorkoutStore {
        &self.store
    }

    /// Take the error from the most recent failed persistence write, if any.
    pub fn take_persist_error(&mut self) -> Option<Error> {
        self.persist_error.take()
    }
}

fn popup_caption(workout: &Workout) -> String {
    format!("{} {}", workout.kind().icon(), workout.description())
}

fn parse_or_zero(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{history, MemorySnapshot, Metrics};
    use chrono::{Datelike, Utc};

    #[derive(Default)]
    struct FakeMap {
        rendered: Vec<(Coords, u8)>,
        markers: Vec<(Coords, String, MarkerStyle)>,
        pans: Vec<(Coords, u8)>,
    }

    impl MapView for FakeMap {
        fn render(&mut self, center: Coords, zoom: u8) {
            self.rendered.push((center, zoom));
        }

        fn place_marker(&mut self, coords: Coords, caption: &str, style: MarkerStyle) {
            self.markers.push((coords, caption.to_string(), style));
        }

        fn pan_to(&mut self, coords: Coords, zoom: u8) {
            self.pans.push((coords, zoom));
        }
    }

    #[derive(Default)]
    struct FakeForm {
        visible: bool,
        focused: usize,
        toggles: usize,
    }

    impl FormView for FakeForm {
        fn show(&mut self) {
            self.visible = true;
        }

        fn hide(&mut self) {
            self.visible = false;
        }

        fn focus_first_field(&mut self) {
            self.focused += 1;
        }

        fn toggle_cadence_elevation(&mut self) {
            self.toggles += 1;
        }
    }

    #[derive(Default)]
    struct FakeList {
        entries: Vec<ListEntry>,
    }

    impl ListView for FakeList {
        fn push_entry(&mut self, entry: ListEntry) {
            self.entries.push(entry);
        }
    }

    /// Snapshot slot whose writes always fail.
    struct BrokenSlot;

    impl Snapshot for BrokenSlot {
        fn read(&self, _key: &str) -> Option<Vec<u8>> {
            None
        }

        fn write(&mut self, _key: &str, _bytes: &[u8]) -> Result<(), Error> {
            Err(Error::Storage("slot quota exceeded".into()))
        }
    }

    fn click() -> Coords {
        Coords { lat: 51.5, lng: -0.1 }
    }

    fn running_fields() -> RawFields {
        RawFields {
            kind: "running".into(),
            distance: "5".into(),
            duration: "25".into(),
            cadence: "180".into(),
            elevation: String::new(),
        }
    }

    #[test]
    fn test_click_then_submit_records_workout() {
        let mut map = FakeMap::default();
        let mut form = FakeForm::default();
        let mut list = FakeList::default();
        let mut slot = MemorySnapshot::new();

        {
            let mut session =
                Session::new(&mut map, &mut form, &mut list, &mut slot, 16);

            session.on_map_clicked(click());
            assert!(session.awaiting_input());

            let outcome = session.on_form_submitted(&running_fields());
            assert!(matches!(outcome, SubmitOutcome::Recorded(_)));
            assert!(!session.awaiting_input());

            assert_eq!(session.store().len(), 1);
            let workout = session.store().iter().next().unwrap();
            match workout.metrics() {
                Metrics::Running { pace_min_per_km, .. } => {
                    assert_eq!(*pace_min_per_km, 5.0);
                }
                other => panic!("Expected running metrics, got {:?}", other),
            }

            let today = Utc::now();
            assert!(workout
                .description()
                .starts_with("Running on"));
            assert!(workout.description().ends_with(&today.day().to_string()));
        }

        // Pending marker at the click, then the labeled running marker.
        assert_eq!(map.markers.len(), 2);
        let (coords, caption, style) = &map.markers[1];
        assert_eq!(*coords, click());
        assert!(caption.contains("Running on"));
        assert_eq!(*style, MarkerStyle::Kind(WorkoutKind::Running));

        // List rendered, form closed, store persisted.
        assert_eq!(list.entries.len(), 1);
        assert!(!form.visible);
        assert_eq!(history::load(&slot).len(), 1);
    }

    #[test]
    fn test_invalid_submit_changes_nothing() {
        let mut map = FakeMap::default();
        let mut form = FakeForm::default();
        let mut list = FakeList::default();
        let mut slot = MemorySnapshot::new();

        {
            let mut session =
                Session::new(&mut map, &mut form, &mut list, &mut slot, 16);

            session.on_map_clicked(click());
            let mut fields = running_fields();
            fields.distance = "abc".into();

            assert_eq!(session.on_form_submitted(&fields), SubmitOutcome::Rejected);
            assert_eq!(session.store().len(), 0);
            // The click is still pending; the user can fix the form.
            assert!(session.awaiting_input());
        }

        assert!(form.visible, "form stays open after a rejected submit");
        assert!(list.entries.is_empty());
        assert!(slot.read(history::HISTORY_KEY).is_none(), "no persistence write");
    }

    #[test]
    fn test_submit_without_click_is_ignored() {
        let mut map = FakeMap::default();
        let mut form = FakeForm::default();
        let mut list = FakeList::default();
        let mut slot = MemorySnapshot::new();

        let mut session = Session::new(&mut map, &mut form, &mut list, &mut slot, 16);

        assert_eq!(
            session.on_form_submitted(&running_fields()),
            SubmitOutcome::Ignored
        );
        assert_eq!(session.store().len(), 0);
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let mut map = FakeMap::default();
        let mut form = FakeForm::default();
        let mut list = FakeList::default();
        let mut slot = MemorySnapshot::new();

        let mut session = Session::new(&mut map, &mut form, &mut list, &mut slot, 16);
        session.on_map_clicked(click());

        let mut fields = running_fields();
        fields.kind = "rowing".into();
        assert_eq!(session.on_form_submitted(&fields), SubmitOutcome::Rejected);
    }

    #[test]
    fn test_new_click_overwrites_pending_state() {
        let mut map = FakeMap::default();
        let mut form = FakeForm::default();
        let mut list = FakeList::default();
        let mut slot = MemorySnapshot::new();

        {
            let mut session =
                Session::new(&mut map, &mut form, &mut list, &mut slot, 16);

            session.on_map_clicked(Coords { lat: 1.0, lng: 1.0 });
            session.on_map_clicked(click());
            session.on_form_submitted(&running_fields());

            let workout = session.store().iter().next().unwrap();
            assert_eq!(workout.coords(), click());
        }

        assert_eq!(form.focused, 2);
    }

    #[test]
    fn test_geolocation_ready_replays_markers() {
        let mut slot = MemorySnapshot::new();

        // First session records two workouts.
        {
            let mut session = Session::new(
                FakeMap::default(),
                FakeForm::default(),
                FakeList::default(),
                &mut slot,
                16,
            );
            session.on_map_clicked(click());
            session.on_form_submitted(&running_fields());
            session.on_map_clicked(Coords { lat: 48.85, lng: 2.35 });
            let fields = RawFields {
                kind: "cycling".into(),
                distance: "10".into(),
                duration: "40".into(),
                cadence: String::new(),
                elevation: "200".into(),
            };
            session.on_form_submitted(&fields);
        }

        // A fresh session hydrates and replays on the geolocation fix.
        let mut map = FakeMap::default();
        let mut list = FakeList::default();
        {
            let mut session = Session::new(
                &mut map,
                FakeForm::default(),
                &mut list,
                &mut slot,
                16,
            );
            session.on_geolocation_ready(Coords { lat: 50.0, lng: 0.0 });
        }

        // List replayed at construction, markers on the fix.
        assert_eq!(list.entries.len(), 2);
        assert_eq!(map.rendered, vec![(Coords { lat: 50.0, lng: 0.0 }, 16)]);
        assert_eq!(map.markers.len(), 2);
        assert_eq!(map.markers[0].2, MarkerStyle::Kind(WorkoutKind::Running));
        assert_eq!(map.markers[1].2, MarkerStyle::Kind(WorkoutKind::Cycling));
    }

    #[test]
    fn test_list_activation_pans_to_workout() {
        let mut map = FakeMap::default();
        let mut slot = MemorySnapshot::new();

        {
            let mut session = Session::new(
                &mut map,
                FakeForm::default(),
                FakeList::default(),
                &mut slot,
                13,
            );
            session.on_map_clicked(click());
            let outcome = session.on_form_submitted(&running_fields());
            let id = match outcome {
                SubmitOutcome::Recorded(id) => id,
                other => panic!("Expected Recorded, got {:?}", other),
            };

            session.on_list_item_activated(&id);
            session.on_list_item_activated("0000000000"); // stale id, no-op
        }

        assert_eq!(map.pans, vec![(click(), 13)]);
    }

    #[test]
    fn test_kind_change_toggles_form_rows() {
        let mut form = FakeForm::default();
        let mut slot = MemorySnapshot::new();

        {
            let mut session = Session::new(
                FakeMap::default(),
                &mut form,
                FakeList::default(),
                &mut slot,
                16,
            );
            session.on_kind_changed();
        }

        assert_eq!(form.toggles, 1);
    }

    #[test]
    fn test_persist_failure_is_observable_but_not_fatal() {
        let mut session = Session::new(
            FakeMap::default(),
            FakeForm::default(),
            FakeList::default(),
            BrokenSlot,
            16,
        );

        session.on_map_clicked(click());
        let outcome = session.on_form_submitted(&running_fields());

        // The workout exists for this session even though the write failed.
        assert!(matches!(outcome, SubmitOutcome::Recorded(_)));
        assert_eq!(session.store().len(), 1);

        let error = session.take_persist_error();
        assert!(matches!(error, Some(Error::Storage(_))));
        assert!(session.take_persist_error().is_none());
    }
}
