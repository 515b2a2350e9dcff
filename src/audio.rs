//! Output device: the seam the playback engine drives, and the rodio-backed
//! implementation that owns the process-wide audio output on its own thread.

mod device;
mod player;
mod sink;
mod thread;
mod types;

pub use device::OutputDevice;
pub use player::RodioDevice;
pub use types::DeviceEvent;
