/// Input boundary for the battery health service.
///
/// Submodules:
/// - `dataset`: loads the bundled JSON reading collection into validated
///   `Reading`s.

pub mod dataset;
