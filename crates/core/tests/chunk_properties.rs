use std::collections::HashSet;

use docchat_core::{chunk, ChunkConfig};
use proptest::prelude::*;

fn sized_config() -> impl Strategy<Value = (usize, usize)> {
    // window size with an overlap strictly below it
    (2usize..40).prop_flat_map(|size| (Just(size), 0..size))
}

proptest! {
    #[test]
    fn every_word_lands_in_some_chunk(
        n in 0usize..300,
        size in 1usize..40,
        overlap in 0usize..50,
    ) {
        let words: Vec<String> = (0..n).map(|i| format!("w{i}")).collect();
        let text = words.join(" ");
        let chunks = chunk(
            &text,
            &ChunkConfig { chunk_words: size, overlap_words: overlap },
        );
        let seen: HashSet<&str> = chunks
            .iter()
            .flat_map(|c| c.split_whitespace())
            .collect();
        for word in &words {
            prop_assert!(seen.contains(word.as_str()));
        }
    }

    #[test]
    fn chunk_count_matches_window_arithmetic(
        n in 1usize..300,
        (size, overlap) in sized_config(),
    ) {
        let words: Vec<String> = (0..n).map(|i| format!("w{i}")).collect();
        let text = words.join(" ");
        let chunks = chunk(
            &text,
            &ChunkConfig { chunk_words: size, overlap_words: overlap },
        );
        let step = size - overlap;
        let expected = if n <= size {
            1
        } else {
            (n - size + step - 1) / step + 1
        };
        prop_assert_eq!(chunks.len(), expected);
    }

    #[test]
    fn consecutive_chunks_share_the_overlap(
        n in 1usize..300,
        (size, overlap) in sized_config(),
    ) {
        let words: Vec<String> = (0..n).map(|i| format!("w{i}")).collect();
        let text = words.join(" ");
        let chunks = chunk(
            &text,
            &ChunkConfig { chunk_words: size, overlap_words: overlap },
        );
        for pair in chunks.windows(2) {
            let left: Vec<&str> = pair[0].split_whitespace().collect();
            let right: Vec<&str> = pair[1].split_whitespace().collect();
            let tail = &left[left.len() - overlap.min(left.len())..];
            prop_assert_eq!(&right[..tail.len()], tail);
        }
    }
}
