mod sources;

pub use sources::SourcesCommands;
