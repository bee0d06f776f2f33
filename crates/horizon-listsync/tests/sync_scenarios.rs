//! End-to-end tests: model mutations and drops, observed on a recording surface.

use std::sync::Arc;

use parking_lot::Mutex;

use horizon_listsync::model::{
    EventScope, Item, MutationEvent, MutationKind, ObservableCollection, ObservableVec, Section,
    SectionedModel,
};
use horizon_listsync::view::{IndexPath, RecordingSurface, RowAnimation, SurfaceCall};
use horizon_listsync::{DropProposal, ListSynchronizer, MultiRowMoves, SyncConfig, SyncError};

type Model = Arc<SectionedModel<&'static str>>;
type Surface = Arc<Mutex<RecordingSurface>>;
type Synchronizer = Arc<ListSynchronizer<&'static str, RecordingSurface>>;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Section A = [x, y, z] (sortable), B = [u] (sortable), C = [v] (not sortable).
fn fixture(config: SyncConfig) -> (Model, Surface, Synchronizer) {
    init_tracing();
    let model = Arc::new(SectionedModel::with_sections([
        Section::with_items("A", vec![Item::new("x"), Item::new("y"), Item::new("z")])
            .with_drag_sortable(true),
        Section::with_items("B", vec![Item::new("u")]).with_drag_sortable(true),
        Section::with_items("C", vec![Item::new("v")]),
    ]));
    let surface = Arc::new(Mutex::new(RecordingSurface::attached(&model)));
    let sync = ListSynchronizer::attach(model.clone(), surface.clone(), config);
    (model, surface, sync)
}

fn payloads(model: &Model, section: usize) -> Vec<&'static str> {
    model.section(section).unwrap().items().snapshot()
}

fn assert_in_sync(model: &Model, surface: &Surface) {
    let surface = surface.lock();
    assert_eq!(surface.row_counts(), model.row_counts().as_slice());
    assert!(
        surface.inconsistencies().is_empty(),
        "{:?}",
        surface.inconsistencies()
    );
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_remove_one_row() {
    let (model, surface, _sync) = fixture(SyncConfig::default());

    model.section(0).unwrap().mutate(|items| items.remove(1));

    assert_eq!(
        surface.lock().transactions(),
        vec![vec![SurfaceCall::DeleteRows(
            vec![IndexPath::new(0, 1)],
            RowAnimation::Automatic
        )]]
    );
    assert_eq!(surface.lock().row_counts()[0], 2);
    assert_in_sync(&model, &surface);
}

#[test]
fn test_unknown_index_reloads_alone() {
    let (model, surface, _sync) = fixture(SyncConfig::default());
    let a = model.section(0).unwrap();
    let items = a.managed_items().unwrap();

    items.set_reports_indices(false);
    items.push(Item::new("w"));
    items.set_reports_indices(true);
    items.remove(0);

    let txns = surface.lock().transactions();
    assert_eq!(txns.len(), 2);
    assert_eq!(txns[0], vec![SurfaceCall::ReloadData]);
    assert_eq!(
        txns[1],
        vec![SurfaceCall::DeleteRows(
            vec![IndexPath::new(0, 0)],
            RowAnimation::Automatic
        )]
    );
    assert_in_sync(&model, &surface);
}

#[test]
fn test_unknown_index_from_raw_event() {
    let (model, surface, sync) = fixture(SyncConfig::default());
    let b = model.section(1).unwrap();

    let event = MutationEvent::from_raw(MutationKind::Add, EventScope::Item, -1, -1, 1).unwrap();
    assert_eq!(sync.handle_item_event(b.id(), &event).unwrap(), 1);
    assert_eq!(surface.lock().transactions(), vec![vec![SurfaceCall::ReloadData]]);
}

#[test]
fn test_move_forward_within_section() {
    let (model, surface, _sync) = fixture(SyncConfig::default());

    let items = model.section(0).unwrap().managed_items().unwrap();
    assert!(items.move_item(0, 2));

    assert_eq!(
        surface.lock().transactions(),
        vec![vec![SurfaceCall::MoveRow(
            IndexPath::new(0, 0),
            IndexPath::new(0, 2)
        )]]
    );
    assert_eq!(payloads(&model, 0), vec!["y", "z", "x"]);
    assert_in_sync(&model, &surface);
}

#[test]
fn test_drag_across_sections() {
    let (model, surface, sync) = fixture(SyncConfig::default());

    let handle = sync.begin_drag(IndexPath::new(0, 2)).unwrap().unwrap();
    assert_eq!(handle.payload(), "0,2");
    assert_eq!(
        sync.drop_proposal(Some(IndexPath::new(1, 0)), 1),
        DropProposal::Move
    );
    assert!(sync.perform_drop(&handle, IndexPath::new(1, 0)).unwrap());

    assert_eq!(payloads(&model, 0), vec!["x", "y"]);
    assert_eq!(payloads(&model, 1), vec!["z", "u"]);
    assert_eq!(
        surface.lock().transactions(),
        vec![
            vec![SurfaceCall::DeleteRows(
                vec![IndexPath::new(0, 2)],
                RowAnimation::Fade
            )],
            vec![SurfaceCall::InsertRows(
                vec![IndexPath::new(1, 0)],
                RowAnimation::None
            )],
        ]
    );
    assert_in_sync(&model, &surface);
}

#[test]
fn test_drag_into_non_sortable_section() {
    let (model, surface, sync) = fixture(SyncConfig::default());
    let dest = IndexPath::new(2, 0);

    assert!(!sync.can_drop(dest));
    assert_eq!(sync.drop_proposal(Some(dest), 1), DropProposal::Cancel);

    let handle = sync.begin_drag(IndexPath::new(0, 0)).unwrap().unwrap();
    assert!(!sync.perform_drop(&handle, dest).unwrap());

    assert_eq!(model.row_counts(), vec![3, 1, 1]);
    assert!(surface.lock().calls().is_empty());
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_row_counts_match_after_every_event() {
    let (model, surface, _sync) = fixture(SyncConfig::default());
    let a = model.section(0).unwrap();
    let b = model.section(1).unwrap();

    let steps: Vec<Box<dyn Fn()>> = vec![
        Box::new(|| a.mutate(|items| items.push(Item::new("w")))),
        Box::new(|| {
            a.mutate(|items| items.insert_many(1, vec![Item::new("p"), Item::new("q")]))
                .unwrap()
        }),
        Box::new(|| {
            a.mutate(|items| items.remove_range(0..3));
        }),
        Box::new(|| {
            b.mutate(|items| items.replace(0, Item::new("U")))
                .unwrap();
        }),
        Box::new(|| {
            a.mutate(|items| items.move_item(2, 0));
        }),
        Box::new(|| {
            model.insert_section(1, Section::with_items("D", vec![Item::new("d")]))
                .unwrap();
        }),
        Box::new(|| {
            model.replace_section(2, Section::with_items("E", vec![Item::new("e"), Item::new("f")]))
                .unwrap();
        }),
        Box::new(|| {
            model.remove_section(0);
        }),
        Box::new(|| {
            model.move_section(0, 1);
        }),
    ];

    for (i, step) in steps.iter().enumerate() {
        step();
        let surface = surface.lock();
        assert_eq!(
            surface.row_counts(),
            model.row_counts().as_slice(),
            "after step {i}"
        );
        assert!(surface.inconsistencies().is_empty(), "after step {i}");
    }
}

#[test]
fn test_each_event_gets_its_own_transaction() {
    let (model, surface, sync) = fixture(SyncConfig::default());
    let a = model.section(0).unwrap();

    a.mutate(|items| items.push(Item::new("w")));
    a.mutate(|items| items.remove(0));
    a.set_title(Some("Alpha".into()));

    assert_eq!(surface.lock().transactions().len(), 3);
    assert_eq!(sync.transactions(), 3);
}

#[test]
fn test_cold_surface_is_left_alone_until_realized() {
    init_tracing();
    let model: Model = Arc::new(SectionedModel::with_sections([Section::with_items(
        "A",
        vec![Item::new("x")],
    )]));
    let surface = Arc::new(Mutex::new(RecordingSurface::attached(&model)));
    surface.lock().set_realized(false);
    let _sync = ListSynchronizer::attach(model.clone(), surface.clone(), SyncConfig::default());

    let a = model.section(0).unwrap();
    a.mutate(|items| items.push(Item::new("y")));
    a.mutate(|items| items.remove(0));
    assert!(surface.lock().calls().is_empty());

    // Reset still goes through.
    a.mutate(|items| items.reset(vec![Item::new("p"), Item::new("q"), Item::new("r")]));
    assert_eq!(surface.lock().transactions(), vec![vec![SurfaceCall::ReloadData]]);

    surface.lock().realize();
    assert_in_sync(&model, &surface);
}

#[test]
fn test_multi_row_move_policy() {
    let (model, surface, sync) =
        fixture(SyncConfig::default().with_multi_row_moves(MultiRowMoves::PerUnitShift));
    let a = model.section(0).unwrap();

    let event = MutationEvent::moved(EventScope::Item, 1, 0, 2);
    sync.handle_item_event(a.id(), &event).unwrap();

    assert_eq!(
        surface.lock().transactions(),
        vec![vec![
            SurfaceCall::MoveRow(IndexPath::new(0, 1), IndexPath::new(0, 0)),
            SurfaceCall::MoveRow(IndexPath::new(0, 2), IndexPath::new(0, 1)),
        ]]
    );

    let (model, surface, sync) = fixture(SyncConfig::default());
    let a = model.section(0).unwrap();
    sync.handle_item_event(a.id(), &event).unwrap();
    assert_eq!(surface.lock().transactions(), vec![vec![SurfaceCall::ReloadData]]);
}

#[test]
fn test_malformed_event_is_an_error() {
    let (model, surface, sync) = fixture(SyncConfig::default());
    let a = model.section(0).unwrap();

    assert!(matches!(
        MutationEvent::from_raw(MutationKind::Remove, EventScope::Item, 0, -1, -1),
        Err(SyncError::InvalidEvent { .. })
    ));
    let zero = MutationEvent::removed(EventScope::Item, 0, 0);
    assert!(matches!(
        sync.handle_item_event(a.id(), &zero),
        Err(SyncError::InvalidEvent { .. })
    ));
    assert!(surface.lock().calls().is_empty());
}

#[test]
fn test_every_valid_drop_moves_exactly_one_item() {
    let sources = [
        IndexPath::new(0, 0),
        IndexPath::new(0, 1),
        IndexPath::new(0, 2),
        IndexPath::new(1, 0),
        IndexPath::new(2, 0),
    ];
    for source in sources {
        for dest_section in 0..2 {
            let (model, _, _) = fixture(SyncConfig::default());
            let capacity = model.row_count(dest_section).unwrap()
                - usize::from(source.section == dest_section);
            for row in 0..=capacity {
                let (model, surface, sync) = fixture(SyncConfig::default());
                let before = model.row_counts();
                let dest = IndexPath::new(dest_section, row);
                let handle = sync.begin_drag(source).unwrap().unwrap();

                assert!(sync.perform_drop(&handle, dest).unwrap(), "{source} -> {dest}");

                let after = model.row_counts();
                if source.section == dest_section {
                    assert_eq!(after, before);
                } else {
                    assert_eq!(after[source.section], before[source.section] - 1);
                    assert_eq!(after[dest_section], before[dest_section] + 1);
                }
                assert_eq!(
                    model.section(dest_section).unwrap().items().item_id(row),
                    Some(handle.item())
                );

                let txns = surface.lock().transactions();
                assert_eq!(txns.len(), 2);
                assert!(matches!(txns[0][..], [SurfaceCall::DeleteRows(..)]));
                assert!(matches!(txns[1][..], [SurfaceCall::InsertRows(..)]));
                assert_in_sync(&model, &surface);
            }
        }
    }
}

#[test]
fn test_non_sortable_destination_rejects_every_source() {
    let (model, surface, sync) = fixture(SyncConfig::default());
    for section in 0..model.len() {
        for row in 0..model.row_count(section).unwrap() {
            let handle = sync.begin_drag(IndexPath::new(section, row)).unwrap().unwrap();
            assert!(!sync.can_drop(IndexPath::new(2, 0)));
            assert!(!sync.perform_drop(&handle, IndexPath::new(2, 1)).unwrap());
        }
    }
    assert_eq!(model.row_counts(), vec![3, 1, 1]);
    assert!(surface.lock().calls().is_empty());
}

#[test]
fn test_drop_outside_bounds_is_cancelled() {
    let (model, surface, sync) = fixture(SyncConfig::default());
    let handle = sync.begin_drag(IndexPath::new(0, 0)).unwrap().unwrap();

    assert!(!sync.perform_drop(&handle, IndexPath::new(9, 0)).unwrap());
    assert!(!sync.perform_drop(&handle, IndexPath::new(1, 5)).unwrap());
    assert_eq!(sync.drop_proposal(None, 1), DropProposal::Cancel);

    assert_eq!(payloads(&model, 0), vec!["x", "y", "z"]);
    assert!(surface.lock().calls().is_empty());
}

// =============================================================================
// Bound collections
// =============================================================================

#[test]
fn test_bound_collection_events_and_drop() {
    let (model, surface, sync) = fixture(SyncConfig::default());
    let external: Arc<ObservableVec<&'static str>> =
        Arc::new(ObservableVec::from_payloads(["m", "n"]));

    let b = model.section(1).unwrap();
    b.set_items_source(external.clone());
    assert_eq!(surface.lock().transactions(), vec![vec![SurfaceCall::ReloadData]]);
    assert_in_sync(&model, &surface);

    external.push(Item::new("o"));
    assert_in_sync(&model, &surface);

    surface.lock().clear_calls();
    let handle = sync.begin_drag(IndexPath::new(1, 0)).unwrap().unwrap();
    assert!(sync.perform_drop(&handle, IndexPath::new(0, 3)).unwrap());

    let remaining: Vec<&str> = (external.as_ref() as &dyn ObservableCollection<_>).snapshot();
    assert_eq!(remaining, vec!["n", "o"]);
    assert_eq!(payloads(&model, 0), vec!["x", "y", "z", "m"]);
    assert_eq!(surface.lock().transactions().len(), 2);
    assert_in_sync(&model, &surface);
}

#[test]
fn test_drop_from_payload() {
    let (model, surface, sync) = fixture(SyncConfig::default());

    assert!(sync.perform_drop_payload("2,0", IndexPath::new(1, 1)).unwrap());
    assert!(!sync.perform_drop_payload("not a path", IndexPath::new(1, 0)).unwrap());
    assert!(!sync.perform_drop_payload("2,0", IndexPath::new(1, 0)).unwrap());

    assert_eq!(payloads(&model, 1), vec!["u", "v"]);
    assert_eq!(model.row_counts(), vec![3, 2, 0]);
    assert_in_sync(&model, &surface);
}

#[test]
fn test_sortable_origin_required() {
    let (_model, _surface, sync) =
        fixture(SyncConfig::default().with_sortable_origin_required(true));
    assert!(sync.begin_drag(IndexPath::new(2, 0)).unwrap().is_none());
    assert!(sync.begin_drag(IndexPath::new(0, 0)).unwrap().is_some());
}

// =============================================================================
// Section properties
// =============================================================================

#[test]
fn test_section_property_changes() {
    let (model, surface, _sync) = fixture(SyncConfig::default());
    let b = model.section(1).unwrap();

    b.set_visible(false);
    b.set_footer_text(Some("2 devices".into()));
    b.set_drag_sortable(false);
    b.set_footer_text(Some("2 devices".into()));

    assert_eq!(
        surface.lock().transactions(),
        vec![
            vec![SurfaceCall::ReloadSection(1, RowAnimation::Automatic)],
            vec![SurfaceCall::ReloadSection(1, RowAnimation::None)],
        ]
    );
    assert!(!b.is_drag_sortable());
    assert_in_sync(&model, &surface);
}
