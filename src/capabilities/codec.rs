//! Codec compatibility filtering.

use crate::assert_invariant;
use crate::errors::CapabilityError;
use crate::platform::EncoderCapability;
use crate::types::CodecOption;

/// Codecs from [`CodecOption::PRIORITY`] whose encoder can be instantiated.
///
/// Falls back to `fallback` when nothing is available, so the result is
/// never empty.
pub fn supported_codecs<E: EncoderCapability + ?Sized>(encoders: &E, fallback: CodecOption) -> Vec<CodecOption> {
    let mut codecs = Vec::new();
    for codec in CodecOption::PRIORITY {
        match encoders.is_encoder_available(codec.mime_type()) {
            Ok(true) => codecs.push(codec),
            Ok(false) => log::debug!("No encoder for {}", codec.mime_type()),
            Err(e) => log::warn!("Encoder probe for {} failed: {}", codec.mime_type(), e),
        }
    }

    if codecs.is_empty() {
        let err = CapabilityError::EmptyCapabilitySet(format!(
            "no usable video encoder, assuming {}",
            fallback
        ));
        log::warn!("{}", err);
        codecs.push(fallback);
    }

    assert_invariant!(!codecs.is_empty(), "Codec list is never empty", "codec");
    codecs
}

/// Keep `stored` when supported, else the highest-priority supported codec.
pub fn reconcile_codec(stored: Option<CodecOption>, supported: &[CodecOption], fallback: CodecOption) -> CodecOption {
    if let Some(codec) = stored.filter(|c| supported.contains(c)) {
        return codec;
    }
    CodecOption::PRIORITY
        .iter()
        .copied()
        .find(|c| supported.contains(c))
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{DeviceProfile, FailureInjection, ProfilePlatform};

    fn encoders(mimes: &[&str], failing: bool) -> ProfilePlatform {
        ProfilePlatform::new(DeviceProfile {
            encoders: mimes.iter().map(|m| m.to_string()).collect(),
            failures: FailureInjection {
                encoders: failing,
                ..FailureInjection::default()
            },
            ..DeviceProfile::default()
        })
    }

    #[test]
    fn test_filter_keeps_priority_order() {
        let hw = encoders(&["video/avc", "video/hevc"], false);
        assert_eq!(
            supported_codecs(&hw, CodecOption::Hevc),
            vec![CodecOption::Hevc, CodecOption::Avc]
        );
        let avc_only = encoders(&["video/avc"], false);
        assert_eq!(supported_codecs(&avc_only, CodecOption::Hevc), vec![CodecOption::Avc]);
    }

    #[test]
    fn test_empty_or_failing_detection_injects_fallback() {
        assert_eq!(
            supported_codecs(&encoders(&[], false), CodecOption::Hevc),
            vec![CodecOption::Hevc]
        );
        assert_eq!(
            supported_codecs(&encoders(&["video/avc"], true), CodecOption::Avc),
            vec![CodecOption::Avc]
        );
    }

    #[test]
    fn test_reconcile() {
        let avc_only = [CodecOption::Avc];
        assert_eq!(reconcile_codec(Some(CodecOption::Hevc), &avc_only, CodecOption::Hevc), CodecOption::Avc);
        assert_eq!(reconcile_codec(None, &avc_only, CodecOption::Hevc), CodecOption::Avc);
        let both = [CodecOption::Hevc, CodecOption::Avc];
        assert_eq!(reconcile_codec(Some(CodecOption::Avc), &both, CodecOption::Hevc), CodecOption::Avc);
        assert_eq!(reconcile_codec(None, &[], CodecOption::Hevc), CodecOption::Hevc);
    }
}
