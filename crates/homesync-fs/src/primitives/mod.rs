pub mod copy_dir;
pub mod entry;
pub mod move_path;
pub mod replace_dir;
pub mod symlink;

pub use copy_dir::{copy_dir_all, copy_entry};
pub use entry::{create_missing_dirs, entry_exists, remove_created_dirs, remove_entry};
pub use move_path::move_path;
pub use replace_dir::{TargetState, replace_dir};
pub use symlink::copy_symlink;
