//! Property-based tests for `FrameQueue` and frame encoding.
//!
//! These tests generate random batches of lines to verify FIFO delivery and
//! drop-oldest retention when producers outrun the consumer.

use logentries::{EnqueueOutcome, Frame, FrameQueue, LINE_SEPARATOR};
use proptest::prelude::*;

const TOKEN: &str = "550e8400-e29b-41d4-a716-446655440000";

fn frames(lines: &[String]) -> Vec<Frame> {
    lines
        .iter()
        .map(|line| Frame::encode(TOKEN, line).expect("non-empty token"))
        .collect()
}

fn drain(queue: &FrameQueue) -> Vec<Frame> {
    std::iter::from_fn(|| queue.try_dequeue()).collect()
}

proptest! {
    #[test]
    fn queue_is_fifo_below_capacity(ref lines in proptest::collection::vec(".*", 0..64)) {
        let queue = FrameQueue::new(64);
        let expected = frames(lines);
        for frame in expected.iter().cloned() {
            prop_assert_eq!(queue.enqueue(frame), EnqueueOutcome::Appended);
        }
        prop_assert_eq!(queue.size(), expected.len());
        prop_assert_eq!(drain(&queue), expected);
    }

    #[test]
    fn full_queue_retains_the_newest_frames(
        capacity in 1usize..16,
        ref lines in proptest::collection::vec("[a-z]{0,8}", 0..64),
    ) {
        let queue = FrameQueue::new(capacity);
        let all = frames(lines);
        for frame in all.iter().cloned() {
            queue.enqueue(frame);
            prop_assert!(queue.size() <= capacity);
        }
        let keep = all.len().saturating_sub(capacity);
        prop_assert_eq!(drain(&queue), all[keep..].to_vec());
    }

    #[test]
    fn frames_are_single_lines(ref text in ".*(\r\n|\r|\n).*") {
        let frame = Frame::encode(TOKEN, text).expect("non-empty token");
        let decoded = std::str::from_utf8(frame.as_bytes()).expect("utf-8 frame");
        let body = decoded
            .strip_prefix(TOKEN)
            .and_then(|rest| rest.strip_suffix('\n'))
            .expect("token prefix and newline terminator");
        prop_assert!(!body.contains(['\r', '\n']));
        prop_assert!(body.contains(LINE_SEPARATOR));
    }
}
