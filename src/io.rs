//! Narrow reader/writer capabilities around the extractor.
//!
//! The extractor only needs dimensions, spacing, origin and values in, and
//! points plus index pairs out. Both sides are traits so other formats can be
//! plugged in; the bundled implementations use JSON.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::grid::ScalarGrid;
use crate::mesh::ContourMesh;

pub trait GridReader {
    fn read_grid(&mut self) -> Result<ScalarGrid, Error>;
}

pub trait MeshWriter {
    fn write_mesh(&mut self, mesh: &ContourMesh) -> Result<(), Error>;
}

/// Serialized form of a [`ScalarGrid`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridDocument {
    pub dimensions: [usize; 2],
    pub spacing: [f64; 2],
    #[serde(default)]
    pub origin: [f64; 2],
    pub values: Vec<f64>,
}

impl TryFrom<GridDocument> for ScalarGrid {
    type Error = Error;

    fn try_from(doc: GridDocument) -> Result<Self, Error> {
        Ok(ScalarGrid::new(
            doc.dimensions,
            doc.spacing,
            doc.origin,
            doc.values,
        )?)
    }
}

impl From<&ScalarGrid> for GridDocument {
    fn from(grid: &ScalarGrid) -> Self {
        Self {
            dimensions: grid.dimensions(),
            spacing: grid.spacing(),
            origin: grid.origin(),
            values: grid.values().to_vec(),
        }
    }
}

pub struct JsonGridReader<R> {
    inner: R,
}

impl<R: Read> JsonGridReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl JsonGridReader<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, Error> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: Read> GridReader for JsonGridReader<R> {
    fn read_grid(&mut self) -> Result<ScalarGrid, Error> {
        let doc: GridDocument = serde_json::from_reader(&mut self.inner)?;
        doc.try_into()
    }
}

pub struct JsonMeshWriter<W> {
    inner: W,
    pretty: bool,
}

impl<W: Write> JsonMeshWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            pretty: false,
        }
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl JsonMeshWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self, Error> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> MeshWriter for JsonMeshWriter<W> {
    fn write_mesh(&mut self, mesh: &ContourMesh) -> Result<(), Error> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.inner, mesh)?;
        } else {
            serde_json::to_writer(&mut self.inner, mesh)?;
        }
        self.inner.flush()?;
        Ok(())
    }
}
