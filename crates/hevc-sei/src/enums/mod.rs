mod nal_unit_type;
pub use nal_unit_type::*;

mod depth_representation_type;
pub use depth_representation_type::*;
