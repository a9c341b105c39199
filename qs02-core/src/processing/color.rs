//! HDR/SDR classification.
//!
//! Decides the dynamic range of a video stream and the transfer
//! characteristic to tag the output with.

use crate::media::StreamDescriptor;

use serde::Serialize;

/// SMPTE ST 2084 (PQ) transfer characteristic.
pub const TRANSFER_PQ: &str = "smpte2084";

/// ARIB STD-B67 (HLG) transfer characteristic.
pub const TRANSFER_HLG: &str = "arib-std-b67";

/// BT.709 transfer characteristic, used for all SDR content.
pub const TRANSFER_SDR: &str = "bt709";

/// Transfer characteristics that identify HDR content on their own.
pub const HDR_TRANSFERS: [&str; 2] = [TRANSFER_PQ, TRANSFER_HLG];

const TEN_BIT_LE_SUFFIX: &str = "10le";
const BT2020_PRIMARIES: &str = "bt2020";
const BT2020_MATRICES: [&str; 2] = ["bt2020nc", "bt2020c"];

/// Dynamic range of a video stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorVerdict {
    pub is_hdr: bool,
    pub transfer_tag: String,
}

impl ColorVerdict {
    /// "HDR" or "SDR", as used in output names and reports.
    pub fn dynamic_range_label(&self) -> &'static str {
        if self.is_hdr { "HDR" } else { "SDR" }
    }

    /// True for HLG content.
    pub fn is_hlg(&self) -> bool {
        self.is_hdr && self.transfer_tag == TRANSFER_HLG
    }
}

/// Classifies a video stream as HDR or SDR.
///
/// A PQ or HLG transfer tag is authoritative. Without one, a 10-bit
/// little-endian pixel format combined with BT.2020 primaries or matrix is
/// taken as PQ-mastered HDR. This fallback also catches untagged HLG
/// masters and labels them PQ; it is a known approximation.
pub fn classify_color(video: &StreamDescriptor) -> ColorVerdict {
    let transfer = video.color_transfer_str().trim();
    if HDR_TRANSFERS.contains(&transfer) {
        return ColorVerdict {
            is_hdr: true,
            transfer_tag: transfer.to_string(),
        };
    }

    let ten_bit = video.pixel_format_str().ends_with(TEN_BIT_LE_SUFFIX);
    let bt2020 = video.color_primaries_str() == BT2020_PRIMARIES
        || BT2020_MATRICES.contains(&video.color_space_str());
    if ten_bit && bt2020 {
        log::debug!(
            "Stream {} has no HDR transfer tag but is 10-bit BT.2020; assuming PQ",
            video.index
        );
        return ColorVerdict {
            is_hdr: true,
            transfer_tag: TRANSFER_PQ.to_string(),
        };
    }

    ColorVerdict {
        is_hdr: false,
        transfer_tag: TRANSFER_SDR.to_string(),
    }
}
