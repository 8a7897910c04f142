pub mod easy_apply;
