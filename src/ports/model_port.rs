//! Model bundle persistence port.

use crate::domain::bundle::ModelBundle;
use crate::domain::error::StockcastError;

pub trait ModelStore: Send + Sync {
    /// Where the bundle lives, for messages.
    fn location(&self) -> String;

    /// Fails with `ModelNotLoaded` when the bundle is missing or unreadable.
    fn load(&self) -> Result<ModelBundle, StockcastError>;

    fn save(&self, bundle: &ModelBundle) -> Result<(), StockcastError>;
}
