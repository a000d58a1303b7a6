pub mod batch;
pub mod bucket;
pub mod collator;
pub mod loader;
pub mod preprocess;
pub mod readers;
pub mod record;
pub mod shuffle;

pub use batch::PaddedBatch;
pub use bucket::BucketAssembler;
pub use collator::{Collator, PadCollator};
pub use loader::{BatchIter, LoaderConfig, LoaderConfigBuilder, SequenceLoader};
pub use preprocess::{Lowercase, Preprocess};
pub use readers::{ColumnDefault, DelimitedReader, JsonlReader, RecordReader, RecordSchema};
pub use record::{Record, TokenizedRecord};
pub use shuffle::ShuffleBuffer;
