pub mod report_window;
