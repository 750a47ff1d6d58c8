/*!
 * Unwinding tests entry point
 */

#[path = "unwinding/scenario_test.rs"]
mod scenario_test;

#[path = "unwinding/structured_test.rs"]
mod structured_test;

#[path = "unwinding/hosted_driver_test.rs"]
mod hosted_driver_test;

#[path = "unwinding/hosted_heap_test.rs"]
mod hosted_heap_test;

#[path = "unwinding/setup_test.rs"]
mod setup_test;

#[path = "unwinding/property_test.rs"]
mod property_test;

#[path = "unwinding/report_test.rs"]
mod report_test;
