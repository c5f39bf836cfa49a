//! Magnetometer polling and telemetry.

use core::future::Future;

use crate::link::HostLink;
use ubx_proto::{MagData, UbxPayload, MAG_STATUS_VALID};

/// Errors from a magnetometer driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MagError {
    /// Bus transfer failed.
    Bus,
    /// Device did not identify as expected.
    NotPresent,
}

/// A three-axis magnetometer.
pub trait Magnetometer {
    /// Whether a new sample is waiting. Must not block.
    fn data_ready(&mut self) -> impl Future<Output = Result<bool, MagError>>;

    /// Read the waiting sample as raw sensor-frame axes.
    fn read(&mut self) -> impl Future<Output = Result<[i16; 3], MagError>>;
}

/// Rotate a raw sensor sample into the board frame.
///
/// The sensor is mounted rotated by 90 degrees about Z: board X is the
/// negated sensor Y and board Y is the sensor X. Negating `i16::MIN`
/// saturates.
#[must_use]
pub const fn remap_axes(raw: [i16; 3]) -> MagData {
    MagData {
        x: raw[1].saturating_neg(),
        y: raw[0],
        z: raw[2],
        status: MAG_STATUS_VALID,
    }
}

/// Read one sample if available and send it to the host.
///
/// Returns the sample that was sent. A sensor that is not ready, or that
/// fails to answer, is skipped silently until the next tick.
pub async fn poll_magnetometer<M, L>(mag: &mut M, link: &mut L) -> Option<MagData>
where
    M: Magnetometer,
    L: HostLink,
{
    match mag.data_ready().await {
        Ok(true) => {}
        Ok(false) => return None,
        Err(_e) => {
            trace!("mag: ready query failed: {:?}", _e);
            return None;
        }
    }

    let raw = match mag.read().await {
        Ok(raw) => raw,
        Err(_e) => {
            warn!("mag: read failed: {:?}", _e);
            return None;
        }
    };

    let sample = remap_axes(raw);
    let mut frame = [0u8; MagData::FRAME_LEN];
    let len = sample.encode(&mut frame).ok()?;
    let _ = link.send(&frame[..len]).await;
    Some(sample)
}
