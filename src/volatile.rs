//! Resize contract for state derived from viewport dimensions.
//!
//! Anything whose derived data depends on the size of the drawable area
//! (camera aspect ratios, the swap chain, depth buffers) implements
//! [`Volatile`]. The window layer owns the list of targets and pushes every
//! size change through [`resize_all`]; there is no implicit registry.

use crate::error::ResizeError;

/// An object that must recompute derived state when the viewport changes size.
pub trait Volatile {
    /// Adopt a new viewport size in physical pixels.
    ///
    /// Implementations must leave their state untouched when they return an error.
    fn on_resize(&mut self, width: u32, height: u32) -> Result<(), ResizeError>;
}

/// Pushes one resize to every target, in order.
///
/// A failing target does not stop the fan-out; each failure is logged and the
/// first one is returned once all targets have been visited.
pub fn resize_all(
    targets: &mut [&mut dyn Volatile],
    width: u32,
    height: u32,
) -> Result<(), ResizeError> {
    let mut first_error = None;
    for (index, target) in targets.iter_mut().enumerate() {
        if let Err(e) = target.on_resize(width, height) {
            log::warn!("resize target #{index} rejected {width}x{height}: {e}");
            first_error.get_or_insert(e);
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Returns the error a [`Volatile`] should report for a zero-sized viewport.
pub(crate) fn require_extent(width: u32, height: u32) -> Result<(), ResizeError> {
    if width == 0 || height == 0 {
        Err(ResizeError::ZeroExtent { width, height })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        sizes: Vec<(u32, u32)>,
    }

    impl Volatile for Recorder {
        fn on_resize(&mut self, width: u32, height: u32) -> Result<(), ResizeError> {
            require_extent(width, height)?;
            self.sizes.push((width, height));
            Ok(())
        }
    }

    struct Refuser;

    impl Volatile for Refuser {
        fn on_resize(&mut self, width: u32, height: u32) -> Result<(), ResizeError> {
            Err(ResizeError::ZeroExtent { width, height })
        }
    }

    #[test]
    fn fan_out_reaches_every_target() {
        let mut a = Recorder::default();
        let mut b = Recorder::default();
        resize_all(&mut [&mut a, &mut b], 1280, 720).unwrap();
        assert_eq!(a.sizes, vec![(1280, 720)]);
        assert_eq!(b.sizes, vec![(1280, 720)]);
    }

    #[test]
    fn failing_target_does_not_starve_later_ones() {
        let mut refuser = Refuser;
        let mut after = Recorder::default();
        let result = resize_all(&mut [&mut refuser, &mut after], 640, 480);
        assert_eq!(
            result,
            Err(ResizeError::ZeroExtent {
                width: 640,
                height: 480
            })
        );
        assert_eq!(after.sizes, vec![(640, 480)]);
    }

    #[test]
    fn zero_extent_is_rejected() {
        assert!(require_extent(0, 10).is_err());
        assert!(require_extent(10, 0).is_err());
        assert!(require_extent(1, 1).is_ok());
    }
}
