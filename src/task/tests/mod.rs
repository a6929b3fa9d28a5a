//! Unit and behaviour tests for the task lifecycle core.

mod assignment_tests;
mod recurrence_tests;
mod support;
