/// The single output device the playback engine drives.
///
/// Every method is a non-blocking request. Outcomes of `load` and `play`
/// (and the media lifecycle: metadata, progress, end) are reported later as
/// [`DeviceEvent`](super::DeviceEvent)s tagged with the source they came from.
pub trait OutputDevice {
    /// The source most recently assigned with `set_source`.
    fn source(&self) -> Option<&str>;
    /// Point the device at a new source. Takes effect on the next `load`.
    fn set_source(&mut self, source: &str);
    /// Fetch and decode the current source.
    fn load(&mut self);
    /// Start or resume playback.
    fn play(&mut self);
    /// Suspend playback, keeping the position.
    fn pause(&mut self);
    /// Move the playhead to `seconds`.
    fn set_position(&mut self, seconds: f64);
}
