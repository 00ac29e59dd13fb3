pub mod completion_mock;
