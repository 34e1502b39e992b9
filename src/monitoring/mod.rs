/*!
 * Monitoring
 * Tracing setup for hosts of the clipboard core
 */

mod tracer;

pub use tracer::{init_tracing, span_command, CommandSpan};
