pub mod annotations;
pub mod egress;
pub mod labels;
