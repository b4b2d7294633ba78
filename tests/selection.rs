// Copyright (c) 2024 Mike Tsao

use gridsync::prelude::*;
use more_asserts::assert_lt;

/// Three sections on a staircase: bar 0 of channel 0, bar 2 of channel 1, and
/// bar 4 of channel 2.
fn staircase() -> (Arranger, Vec<EntityId>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut arranger = Arranger::new_with(
        AudioEngine::default(),
        &EditorSettings::default(),
        EventBus::default(),
    )
    .unwrap();
    let mut ids = Vec::default();
    for (col, row) in [(0.0, 0.0), (2.0, 1.0), (4.0, 2.0)] {
        arranger.pointer_down(
            Point::new(192.0 * col + 20.0, 40.0 * row + 20.0),
            Tool::Pencil,
            false,
        );
        ids.push(arranger.selected_ids()[0].clone());
    }
    (arranger, ids)
}

fn sorted(mut ids: Vec<EntityId>) -> Vec<EntityId> {
    ids.sort();
    ids
}

#[test]
fn marquee_selection() {
    let (mut arranger, ids) = staircase();

    // Drag from empty space on the bottom row up and to the right.
    arranger.pointer_down(Point::new(10.0, 150.0), Tool::Pointer, false);
    assert!(arranger.selected_ids().is_empty());
    assert_eq!(arranger.drag_mode(), DragMode::MarqueeSelecting);
    arranger.pointer_moved(Point::new(600.0, 10.0));
    arranger.pointer_released(Point::new(600.0, 10.0));
    assert_eq!(
        arranger.selected_ids(),
        sorted(vec![ids[0].clone(), ids[1].clone()])
    );
    assert_eq!(arranger.drag_mode(), DragMode::Idle);

    // An additive marquee keeps what was already selected, even after the
    // marquee stops covering something it had picked up.
    arranger.pointer_down(Point::new(700.0, 150.0), Tool::Pointer, true);
    arranger.pointer_moved(Point::new(1000.0, 90.0));
    assert_eq!(arranger.selected_ids().len(), 3);
    arranger.pointer_moved(Point::new(710.0, 140.0));
    arranger.pointer_released(Point::new(710.0, 140.0));
    assert_eq!(
        arranger.selected_ids(),
        sorted(vec![ids[0].clone(), ids[1].clone()])
    );

    // A plain click on empty space clears everything.
    arranger.pointer_down(Point::new(3000.0, 150.0), Tool::Pointer, false);
    arranger.pointer_released(Point::new(3000.0, 150.0));
    assert!(arranger.selected_ids().is_empty());
    assert!(arranger
        .entities()
        .retrieve_all()
        .all(|entity| !entity.selected));
}

#[test]
fn shifting_stops_at_the_grid_edge() {
    let (mut arranger, ids) = staircase();
    arranger.pointer_down(Point::new(20.0, 20.0), Tool::Pointer, false);
    arranger.pointer_released(Point::new(20.0, 20.0));
    assert_eq!(arranger.selected_ids(), vec![ids[0].clone()]);
    let history_len = arranger.history().len();

    assert!(!arranger.shift_selected(Direction::Up));
    assert!(!arranger.shift_selected(Direction::Left));
    assert_eq!(arranger.history().len(), history_len, "refusals aren't recorded");

    for channel in 1..=3 {
        assert!(arranger.shift_selected(Direction::Down));
        assert_eq!(arranger.engine().find_section(&ids[0]).unwrap().0, channel);
    }
    assert!(!arranger.shift_selected(Direction::Down), "no fifth channel");

    // Selecting all and shifting moves everything or nothing.
    arranger.select_all();
    assert!(!arranger.shift_selected(Direction::Down));
    assert!(arranger.shift_selected(Direction::Right));
    assert_eq!(
        arranger.engine().find_section(&ids[2]).unwrap().1.borrow().start(),
        Ticks::ONE_BAR * 5
    );
}

#[test]
fn zoom_scales_rather_than_resnapping() {
    let (mut arranger, ids) = staircase();
    assert!(matches!(
        arranger.set_zoom(0.0),
        Err(GridSyncError::InvalidRatio(_))
    ));

    arranger.set_zoom(0.5).unwrap();
    let entity = arranger.entities().retrieve_one(&ids[2]).unwrap();
    assert_eq!(entity.x.working(), Px(1536.0));
    assert_eq!(entity.width.working(), Px(384.0));

    // Drag the last section one (now wider) column to the right.
    let start = Point::new(1536.0 + 20.0, 100.0);
    let end = Point::new(start.x.0 + 384.0, 100.0);
    arranger.pointer_down(start, Tool::Pointer, false);
    arranger.pointer_moved(end);
    arranger.pointer_released(end);
    let (channel, section) = arranger.engine().find_section(&ids[2]).unwrap();
    assert_eq!(channel, 2);
    assert_eq!(section.borrow().start(), Ticks::ONE_BAR * 5);

    // A finer grid snaps drags to beats.
    arranger.set_quantize(Quantize::Quarter);
    assert_lt!(arranger.conversion().col_width(), Px(384.0));
    let start = Point::new(1920.0 + 20.0, 100.0);
    let end = Point::new(start.x.0 + 96.0, 100.0);
    arranger.pointer_down(start, Tool::Pointer, false);
    arranger.pointer_moved(end);
    arranger.pointer_released(end);
    assert_eq!(
        section.borrow().start(),
        Ticks::ONE_BAR * 5 + Ticks::ONE_BEAT
    );
}
