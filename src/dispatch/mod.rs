/*!
 * Cross-Boundary Dispatch
 *
 * The module edge between the driver and the frame/raise primitives. The
 * driver never calls the primitives directly: it resolves them by name and
 * calls through `extern "C-unwind"` function pointers, so every exception
 * crosses the boundary on its way out.
 */

pub mod abi;
pub mod exports;
pub mod loader;

pub use abi::{BuildFrameFn, RaiseFn, Symbol, REQUIRED_EXPORTS};
pub use loader::{DispatchTable, ExportTable, ModuleRegistry, SymbolSource};
