use std::io::Result as IoResult;
use std::{convert::Infallible, path::PathBuf, str::FromStr};
use tokio::{
    fs::File,
    io::{self, AsyncReadExt},
};

/// Where certificate bytes come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileContent {
    Inline { content: Vec<u8> },
    Path { path: PathBuf },
    Stdin,
}

impl FileContent {
    pub async fn load_file(self) -> IoResult<Vec<u8>> {
        match self {
            FileContent::Inline { content } => Ok(content),
            FileContent::Path { path } => {
                let mut file = File::open(path).await?;
                let mut buffer = Vec::new();
                file.read_to_end(&mut buffer).await?;
                Ok(buffer)
            }
            FileContent::Stdin => {
                let mut buffer = Vec::new();
                io::stdin().read_to_end(&mut buffer).await?;
                Ok(buffer)
            }
        }
    }
}

impl std::fmt::Display for FileContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileContent::Inline { content } => write!(f, "<{} inline bytes>", content.len()),
            FileContent::Path { path } => write!(f, "{}", path.display()),
            FileContent::Stdin => write!(f, "<stdin>"),
        }
    }
}

/// `-` means standard input, anything else is a path.
impl FromStr for FileContent {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            return Ok(Self::Stdin);
        }
        Ok(Self::Path {
            path: PathBuf::from(s),
        })
    }
}

impl From<PathBuf> for FileContent {
    fn from(path: PathBuf) -> Self {
        Self::Path { path }
    }
}

impl From<Vec<u8>> for FileContent {
    fn from(content: Vec<u8>) -> Self {
        Self::Inline { content }
    }
}
