pub mod builder;
pub mod datum;
pub mod item_set;
pub mod media;
pub mod property;
pub mod registry;
pub mod resource_info;

pub use builder::PayloadBuilder;
pub use datum::MappedDatum;
pub use item_set::ItemSetMapper;
pub use media::MediaMapper;
pub use property::PropertyMapper;
pub use registry::{ColumnMapper, MapperName, MapperRegistry};
pub use resource_info::ResourceInfoMapper;
