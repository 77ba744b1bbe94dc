pub mod evidence;
pub mod media;

