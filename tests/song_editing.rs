// Copyright (c) 2024 Mike Tsao

use gridsync::prelude::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A point inside the arranger cell at the given bar column and channel row,
/// clear of the resize handle.
fn arranger_cell(col: f64, row: f64) -> Point {
    Point::new(192.0 * col + 20.0, 40.0 * row + 20.0)
}

#[test]
fn edit_song() {
    init_logging();
    let settings = EditorSettings::default();
    let bus = EventBus::default();
    let events = bus.subscribe();
    let mut arranger = Arranger::new_with(AudioEngine::default(), &settings, bus).unwrap();

    // Lay down a verse and a chorus on the second channel.
    arranger.pointer_down(arranger_cell(0.0, 1.0), Tool::Pencil, false);
    let verse = arranger.selected_ids()[0].clone();
    arranger.pointer_down(arranger_cell(1.0, 1.0), Tool::Pencil, false);
    let chorus = arranger.selected_ids()[0].clone();
    assert_ne!(verse, chorus);
    assert_eq!(arranger.engine().sections().len(), 2);

    // Open both in a piano roll and draw a middle C at the top of the verse.
    let mut piano_roll = arranger
        .open_piano_roll(&[verse.clone(), chorus.clone()], &settings)
        .unwrap()
        .expect("both ids are sections");
    assert_eq!(piano_roll.conversion().num_bars(), 2);
    let c4_y = 16.0 * piano_roll.conversion().row_of_pitch(Pitch::C4).unwrap() as f64 + 8.0;
    piano_roll.pointer_down(Point::new(10.0, c4_y), Tool::Pencil, false);
    let note = piano_roll.selected_ids()[0].clone();
    assert_eq!(arranger.engine().locate_note(&note), Some((1, verse.clone())));

    // Drag it one bar later. That's the chorus now.
    piano_roll.pointer_down(Point::new(10.0, c4_y), Tool::Pointer, false);
    piano_roll.pointer_moved(Point::new(10.0 + 768.0, c4_y));
    piano_roll.pointer_released(Point::new(10.0 + 768.0, c4_y));
    assert_eq!(arranger.engine().locate_note(&note), Some((1, chorus.clone())));

    let received: Vec<EditorEvent> = events.try_iter().collect();
    assert!(received.contains(&EditorEvent::StateChanged(EditorKind::PianoRoll)));

    // Play the first two bars. The note sounds once, at the top of bar 2.
    arranger.refresh();
    arranger.play();
    let mut heard = Vec::default();
    assert!(arranger
        .on_frame(Ticks::ONE_BAR * 2, &mut |channel, event| heard
            .push((channel, event)))
        .is_some());
    assert_eq!(heard.len(), 1);
    let (channel, event) = &heard[0];
    assert_eq!(*channel, 1);
    assert_eq!(event.note_id, note);
    assert_eq!(event.pitch, Pitch::C4);
    assert_eq!(event.time, Ticks::ONE_BAR);
    arranger.stop();

    // Moving the chorus in the arranger moves the note with it, and the piano
    // roll sees it because both editors share the section.
    arranger.pointer_down(arranger_cell(1.0, 1.0), Tool::Pointer, false);
    arranger.pointer_released(arranger_cell(1.0, 1.0));
    assert_eq!(arranger.selected_ids(), vec![chorus.clone()]);
    assert!(arranger.shift_selected(Direction::Right));
    assert_eq!(piano_roll.note(&note).unwrap().time, Ticks::ONE_BAR * 2);

    // Undo puts it back, still without invalidating the piano roll's handles.
    assert!(arranger.undo().unwrap());
    assert_eq!(piano_roll.note(&note).unwrap().time, Ticks::ONE_BAR);
    assert_eq!(piano_roll.owner_of(&note), Some(chorus));
}

#[test]
fn piano_roll_outlives_arranger_undo() {
    init_logging();
    let settings = EditorSettings::default();
    let mut arranger =
        Arranger::new_with(AudioEngine::default(), &settings, EventBus::default()).unwrap();
    arranger.pointer_down(arranger_cell(0.0, 0.0), Tool::Pencil, false);
    let section = arranger.selected_ids()[0].clone();
    let mut piano_roll = arranger
        .open_piano_roll(&[section.clone()], &settings)
        .unwrap()
        .unwrap();

    // The section goes away and comes back while the piano roll is open.
    assert!(arranger.undo().unwrap());
    assert!(arranger.engine().find_section(&section).is_none());
    assert!(arranger.redo().unwrap());
    piano_roll.refresh();
    assert_eq!(piano_roll.conversion().num_bars(), 1);

    // What the piano roll draws now lands in the arranger's engine.
    let c4_y = 16.0 * piano_roll.conversion().row_of_pitch(Pitch::C4).unwrap() as f64 + 8.0;
    piano_roll.pointer_down(Point::new(10.0, c4_y), Tool::Pencil, false);
    let note = piano_roll.selected_ids()[0].clone();
    assert_eq!(piano_roll.owner_of(&note), Some(section.clone()));
    assert_eq!(arranger.engine().locate_note(&note), Some((0, section)));

    arranger.refresh();
    arranger.play();
    let mut heard = Vec::default();
    arranger.on_frame(Ticks::ONE_BAR, &mut |_, event| heard.push(event.note_id));
    assert_eq!(heard, vec![note]);
}

#[test]
fn history_is_linear() {
    init_logging();
    let mut arranger = Arranger::new_with(
        AudioEngine::default(),
        &EditorSettings::default(),
        EventBus::default(),
    )
    .unwrap();

    arranger.pointer_down(arranger_cell(0.0, 0.0), Tool::Pencil, false);
    let a = arranger.selected_ids()[0].clone();
    arranger.pointer_down(arranger_cell(1.0, 0.0), Tool::Pencil, false);
    let b = arranger.selected_ids()[0].clone();
    assert!(arranger.undo().unwrap());
    assert!(arranger.engine().find_section(&b).is_none());

    // A new edit after undo abandons the redo branch.
    arranger.pointer_down(arranger_cell(2.0, 0.0), Tool::Pencil, false);
    let c = arranger.selected_ids()[0].clone();
    assert!(!arranger.redo().unwrap());
    assert_eq!(arranger.history().len(), 3);
    assert!(arranger.engine().find_section(&a).is_some());
    assert!(arranger.engine().find_section(&c).is_some());
    assert!(arranger.engine().find_section(&b).is_none());

    // Undo all the way down, then all the way back up.
    while arranger.undo().unwrap() {}
    assert!(arranger.engine().sections().is_empty());
    assert!(arranger.entities().is_empty());
    while arranger.redo().unwrap() {}
    assert_eq!(arranger.engine().sections().len(), 2);
    assert_eq!(arranger.entities().len(), 2);
    assert_eq!(arranger.selected_ids(), vec![c]);
}
