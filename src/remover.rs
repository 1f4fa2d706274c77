//! Segmentation capability abstraction

use crate::error::Result;

/// Something that turns an encoded image into an encoded image with the
/// background made transparent.
///
/// Implementations own whatever model or service they talk to. The facade
/// treats them as opaque: it only relies on the returned bytes being an
/// image, typically PNG with an alpha channel.
pub trait BackgroundRemover {
    /// Remove the background from `image`
    ///
    /// # Errors
    /// - `BgStripError::Model` when the backend fails or produces no usable output
    /// - `BgStripError::Decode` when the backend cannot read the input bytes
    fn remove(&self, image: &[u8]) -> Result<Vec<u8>>;

    /// Short human-readable backend name for logs
    fn name(&self) -> &str {
        "unnamed"
    }
}

impl<T: BackgroundRemover + ?Sized> BackgroundRemover for Box<T> {
    fn remove(&self, image: &[u8]) -> Result<Vec<u8>> {
        (**self).remove(image)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<T: BackgroundRemover + ?Sized> BackgroundRemover for &T {
    fn remove(&self, image: &[u8]) -> Result<Vec<u8>> {
        (**self).remove(image)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::test_utils::{FailingRemover, PassthroughRemover};
    use crate::error::BgStripError;

    #[test]
    fn test_boxed_remover_delegates() {
        let remover: Box<dyn BackgroundRemover> = Box::new(PassthroughRemover);
        assert_eq!(remover.remove(&[1, 2, 3]).unwrap(), vec![1, 2, 3]);
        assert_eq!(remover.name(), "passthrough");
    }

    #[test]
    fn test_failing_remover_reports_model_error() {
        let remover = FailingRemover;
        let by_ref: &dyn BackgroundRemover = &remover;
        let err = by_ref.remove(&[]).unwrap_err();
        assert!(matches!(err, BgStripError::Model(_)));
    }
}
