use dtb_edit::EditError;
use fdt::FdtError;

/// Errors produced while loading boot components.
#[derive(Debug)]
pub enum LoadError {
    /// A blob failed header or whole-tree validation.
    Format(FdtError),
    /// A component path did not resolve to a node.
    MissingComponent,
    /// A required property is absent or empty.
    MissingProperty,
    /// A property's byte length fits no known encoding.
    Encoding,
    /// A relocation's source and destination ranges intersect.
    Overlap,
    /// The destination-tree editor failed.
    Patch(EditError),
}

impl From<FdtError> for LoadError {
    fn from(value: FdtError) -> Self {
        LoadError::Format(value)
    }
}

impl From<EditError> for LoadError {
    fn from(value: EditError) -> Self {
        LoadError::Patch(value)
    }
}
