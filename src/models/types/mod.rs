mod epoch_millis;

pub use epoch_millis::EpochMillis;
