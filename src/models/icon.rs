use indexmap::IndexMap;
use std::fmt;

/// A field of an icon definition entry that the extractor knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconField {
    Name,
    FileExtensions,
    FileNames,
    FolderNames,
}

impl IconField {
    /// Literal text that introduces this field in the collapsed definition region.
    pub fn prefix(self) -> &'static str {
        match self {
            IconField::Name => "{ name: ",
            IconField::FileExtensions => "fileExtensions: ",
            IconField::FileNames => "fileNames: ",
            IconField::FolderNames => "folderNames: ",
        }
    }
}

impl fmt::Display for IconField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IconField::Name => "name",
            IconField::FileExtensions => "fileExtensions",
            IconField::FileNames => "fileNames",
            IconField::FolderNames => "folderNames",
        };
        f.write_str(name)
    }
}

/// Extension, file name or folder name patterns attached to an icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    Single(String),
    List(Vec<String>),
}

impl Matcher {
    /// Render the matcher for an index column: single values as-is, lists joined with `/`.
    pub fn render(&self) -> String {
        match self {
            Matcher::Single(value) => value.clone(),
            Matcher::List(values) => values.join("/"),
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Matcher::List(Vec::new())
    }
}

/// One icon entry scanned from a definition file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IconRecord {
    pub name: String,
    pub matchers: IndexMap<IconField, Matcher>,
}

impl IconRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            matchers: IndexMap::new(),
        }
    }

    /// Builder-style helper, mostly useful in tests.
    pub fn with_matcher(mut self, field: IconField, matcher: Matcher) -> Self {
        self.matchers.insert(field, matcher);
        self
    }

    /// Rendered column for `field`; absent fields render as an empty string.
    pub fn column(&self, field: IconField) -> String {
        self.matchers
            .get(&field)
            .map(Matcher::render)
            .unwrap_or_default()
    }
}

/// Which flavour of definition file is being indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    File,
    Folder,
}

impl IndexKind {
    pub const ALL: [IndexKind; 2] = [IndexKind::File, IndexKind::Folder];

    /// Fields the scanner recognises for this kind, name first.
    pub fn fields(self) -> &'static [IconField] {
        match self {
            IndexKind::File => &[
                IconField::Name,
                IconField::FileExtensions,
                IconField::FileNames,
            ],
            IndexKind::Folder => &[IconField::Name, IconField::FolderNames],
        }
    }

    /// Matcher columns written after the name, in output order.
    pub fn columns(self) -> &'static [IconField] {
        &self.fields()[1..]
    }

    pub fn header(self) -> &'static str {
        match self {
            IndexKind::File => "name|extension1/extension2|filename1/filename2",
            IndexKind::Folder => "name|foldername1/foldername2",
        }
    }

    pub fn source_file_name(self) -> &'static str {
        match self {
            IndexKind::File => "fileIcons.ts",
            IndexKind::Folder => "folderIcons.ts",
        }
    }

    pub fn output_file_name(self) -> &'static str {
        match self {
            IndexKind::File => "file_icon_index.txt",
            IndexKind::Folder => "folder_icon_index.txt",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::File => f.write_str("file"),
            IndexKind::Folder => f.write_str("folder"),
        }
    }
}
