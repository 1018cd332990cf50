//! Quality selection scenarios against hand-built buffer states

mod helpers;

use abrsim_common::events::StreamStatus;
use abrsim_common::TierLadder;
use abrsim_player::playback::{BufferStore, PlaybackController, QualitySelector, Timeline};
use abrsim_player::Selection;

use helpers::{T1080, T2160, T480};

fn three_tier_store() -> BufferStore {
    BufferStore::new(
        TierLadder::from_values(&[2160, 1080, 480]).unwrap(),
        Timeline::new(12),
    )
}

#[test]
fn test_only_lowest_tier_filled_falls_back() {
    let mut buffers = three_tier_store();
    for segment in 0..12 {
        buffers.set_filled(T480, segment);
    }

    let selector = QualitySelector::new(&buffers);
    assert_eq!(selector.highest_available(0), Some(T480));
    assert_eq!(selector.select_for_playback(0, T2160), Selection::Fallback(T480));
    assert_eq!(selector.select_for_playback(0, T480), Selection::Preferred(T480));
}

#[test]
fn test_nothing_filled_is_buffering_for_any_preference() {
    let buffers = three_tier_store();
    let selector = QualitySelector::new(&buffers);

    for preferred in [T2160, T1080, T480] {
        assert_eq!(selector.select_for_playback(0, preferred), Selection::Buffering);
    }
}

#[test]
fn test_preferred_filled_always_wins() {
    let mut buffers = three_tier_store();
    buffers.set_filled(T2160, 0);
    buffers.set_filled(T1080, 0);
    buffers.set_filled(T480, 0);

    let selector = QualitySelector::new(&buffers);
    for preferred in [T2160, T1080, T480] {
        assert_eq!(
            selector.select_for_playback(0, preferred),
            Selection::Preferred(preferred)
        );
    }
}

#[test]
fn test_playback_through_mixed_availability() {
    // 2160 ahead on the first segments, 480 covering the rest
    let mut buffers = three_tier_store();
    for segment in 0..3 {
        buffers.set_filled(T2160, segment);
    }
    for segment in 0..12 {
        buffers.set_filled(T480, segment);
    }

    let mut controller = PlaybackController::new(
        Timeline::new(12),
        TierLadder::from_values(&[2160, 1080, 480]).unwrap(),
        T1080,
    );
    controller.toggle_play();

    let mut statuses = Vec::new();
    loop {
        let display = controller.display(&buffers);
        statuses.push((display.selected_tier, display.status));
        if !controller.tick(&buffers).reschedule {
            break;
        }
    }
    statuses.push({
        let display = controller.display(&buffers);
        (display.selected_tier, display.status)
    });

    assert_eq!(controller.current_segment(), 11);
    assert_eq!(statuses[0], (Some(T2160), StreamStatus::Fallback));
    assert_eq!(statuses[3], (Some(T480), StreamStatus::Fallback));
    assert!(statuses
        .iter()
        .all(|(_, status)| *status != StreamStatus::Buffering));
}
