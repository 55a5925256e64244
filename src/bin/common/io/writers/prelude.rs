use ffmc::models::output::Output;

use crate::common::{helpers::FFMCRunError, io::models::output::OutputVariable};

/// Trait implemented by concrete output sinks (e.g. text table, JSON lines) that persist model variables.
pub trait OutputSink: Send {
    fn write(
        &mut self,
        output: &Output,
        stations: &[String],
        variables: &[OutputVariable],
    ) -> Result<(), FFMCRunError>;

    /// Flush what is buffered
    fn finish(&mut self) -> Result<(), FFMCRunError>;
}
