// ============================================================================
// qs02-core/src/processing/audio.rs
// ============================================================================
//
// AUDIO TRACK SELECTION
//
// Picks the source audio track every output slot is derived from. French
// tracks are preferred over English ones, English over everything else, and
// within a language the track with the most channels wins. The ranking is a
// stable sort, so equal tracks keep their source order.

use crate::media::{LanguageTag, StreamDescriptor};

/// The audio stream chosen as the source for all output slots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioSelection<'a> {
    pub stream: &'a StreamDescriptor,
}

fn language_priority(language: LanguageTag) -> u8 {
    match language {
        LanguageTag::Fr => 0,
        LanguageTag::En => 1,
        LanguageTag::Other | LanguageTag::Unknown => 2,
    }
}

/// Returns the audio streams ordered from most to least preferred.
pub fn rank_audio_streams<'a>(streams: &[&'a StreamDescriptor]) -> Vec<&'a StreamDescriptor> {
    let mut ranked = streams.to_vec();
    ranked.sort_by_key(|s| (language_priority(s.language), std::cmp::Reverse(s.channels)));
    ranked
}

/// Selects the preferred audio stream, or `None` when there is none.
pub fn select_best_audio<'a>(streams: &[&'a StreamDescriptor]) -> Option<AudioSelection<'a>> {
    let best = rank_audio_streams(streams).into_iter().next()?;
    log::debug!(
        "Selected audio stream {} ({}, {} ch, {})",
        best.index,
        best.codec_name,
        best.channels,
        best.language
    );
    Some(AudioSelection { stream: best })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::StreamKind;

    fn track(index: usize, language: LanguageTag, channels: u32) -> StreamDescriptor {
        let mut s = StreamDescriptor::new(index, StreamKind::Audio, "ac3");
        s.language = language;
        s.channels = channels;
        s
    }

    #[test]
    fn test_french_surround_beats_english_and_french_stereo() {
        let en2 = track(1, LanguageTag::En, 2);
        let fr6 = track(2, LanguageTag::Fr, 6);
        let fr2 = track(3, LanguageTag::Fr, 2);
        let selection = select_best_audio(&[&en2, &fr6, &fr2]).unwrap();
        assert_eq!(selection.stream.index, 2);
    }

    #[test]
    fn test_english_beats_other_language_with_more_channels() {
        let en6 = track(1, LanguageTag::En, 6);
        let other8 = track(2, LanguageTag::Other, 8);
        let selection = select_best_audio(&[&other8, &en6]).unwrap();
        assert_eq!(selection.stream.index, 1);
    }

    #[test]
    fn test_ties_keep_source_order() {
        let a = track(4, LanguageTag::Unknown, 2);
        let b = track(5, LanguageTag::Other, 2);
        let ranked = rank_audio_streams(&[&a, &b]);
        assert_eq!(ranked[0].index, 4);
        assert_eq!(ranked[1].index, 5);
    }

    #[test]
    fn test_full_ranking() {
        let other6 = track(1, LanguageTag::Other, 6);
        let en2 = track(2, LanguageTag::En, 2);
        let fr2 = track(3, LanguageTag::Fr, 2);
        let en8 = track(4, LanguageTag::En, 8);
        let indices: Vec<usize> = rank_audio_streams(&[&other6, &en2, &fr2, &en8])
            .iter()
            .map(|s| s.index)
            .collect();
        assert_eq!(indices, vec![3, 4, 2, 1]);
    }

    #[test]
    fn test_no_audio() {
        assert!(select_best_audio(&[]).is_none());
    }
}
