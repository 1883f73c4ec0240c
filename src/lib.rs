pub mod jvm;
