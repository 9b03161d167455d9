use crate::color::Color;
use crate::error::{SceneError, SceneResult};

use log::*;
use std::convert::TryFrom;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

// largest width or height a PNG header can carry
const MAX_SIDE: i64 = (1 << 31) - 1;

/// Fixed-size RGBA pixel buffer, stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    w: u32,
    h: u32,
    buf: Vec<Color>,
}

impl Scene {
    /// Allocates a `width` x `height` scene with every pixel transparent.
    pub fn new(width: i64, height: i64) -> SceneResult<Self> {
        let invalid = || SceneError::InvalidDimensions { width, height };
        if width <= 0 || height <= 0 || width > MAX_SIDE || height > MAX_SIDE {
            return Err(invalid());
        }
        let w = u32::try_from(width).map_err(|_| invalid())?;
        let h = u32::try_from(height).map_err(|_| invalid())?;
        let len = (w as usize).checked_mul(h as usize).ok_or_else(invalid)?;
        let bytes = len
            .checked_mul(std::mem::size_of::<Color>())
            .ok_or_else(invalid)?;
        if bytes > isize::MAX as usize {
            return Err(invalid());
        }
        let mut buf = Vec::new();
        buf.try_reserve_exact(len).map_err(|_| invalid())?;
        buf.resize(len, Color::default());
        Ok(Scene { w, h, buf })
    }

    /// Decodes an image file into a scene. The format is sniffed from the
    /// file contents, so the extension does not matter.
    pub fn load<P: AsRef<Path>>(path: P) -> SceneResult<Self> {
        let path = path.as_ref();
        let img = image::ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| SceneError::io(path, e))?
            .decode()
            .map_err(|e| SceneError::codec(path, e))?
            .to_rgba8();
        let (w, h) = img.dimensions();
        let mut scene = Self::new(w as i64, h as i64)?;
        for (dst, src) in scene.buf.iter_mut().zip(img.pixels()) {
            *dst = Color::from(src.0);
        }
        debug!("loaded {}x{} scene from {}", w, h, path.display());
        Ok(scene)
    }

    pub fn w(&self) -> u32 {
        self.w
    }

    pub fn h(&self) -> u32 {
        self.h
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        if x < self.w && y < self.h {
            Some(self.buf[self.index(x, y)])
        } else {
            None
        }
    }

    pub fn pixels(&self) -> &[Color] {
        &self.buf[..]
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.w as usize + x as usize
    }

    /// Sets every pixel to `f(x, y)`, calling `f` once per coordinate.
    pub fn for_each_pixel<F>(&mut self, mut f: F)
    where
        F: FnMut(u32, u32) -> Color,
    {
        let w = self.w as usize;
        for (yi, row) in self.buf.chunks_mut(w).enumerate() {
            for (xi, pixel) in row.iter_mut().enumerate() {
                *pixel = f(xi as u32, yi as u32);
            }
        }
    }

    /// Same as `for_each_pixel`, but splits the rows into disjoint bands
    /// filled by `nthread` scoped worker threads. `nthread == 0` uses one
    /// thread per CPU.
    pub fn par_for_each_pixel<F>(&mut self, nthread: usize, f: F)
    where
        F: Fn(u32, u32) -> Color + Sync,
    {
        let w = self.w as usize;
        let h = self.h as usize;
        let nthread = if nthread == 0 { num_cpus::get() } else { nthread };
        let nthread = nthread.min(h);
        let rows_per_band = h.div_ceil(nthread);
        debug!(
            "filling {}x{} scene on {} threads, {} rows each",
            w, h, nthread, rows_per_band
        );
        let f = &f;
        std::thread::scope(|s| {
            for (band, pixels) in self.buf.chunks_mut(rows_per_band * w).enumerate() {
                let y0 = band * rows_per_band;
                s.spawn(move || {
                    for (i, pixel) in pixels.iter_mut().enumerate() {
                        let xi = (i % w) as u32;
                        let yi = (y0 + i / w) as u32;
                        *pixel = f(xi, yi);
                    }
                });
            }
        });
    }

    /// Writes the scene as an RGBA8 PNG, replacing any existing file.
    pub fn persist<P: AsRef<Path>>(&self, path: P) -> SceneResult<()> {
        self.persist_with(path.as_ref(), |file| self.encode_png(file))
    }

    // a partially written file is removed when `encode` fails
    fn persist_with<E>(&self, path: &Path, encode: E) -> SceneResult<()>
    where
        E: FnOnce(File) -> image::ImageResult<()>,
    {
        let file = File::create(path).map_err(|e| SceneError::io(path, e))?;
        if let Err(e) = encode(file) {
            if let Err(rm) = std::fs::remove_file(path) {
                warn!("could not remove partial file {}: {}", path.display(), rm);
            }
            return Err(SceneError::codec(path, e));
        }
        debug!("wrote {}x{} scene to {}", self.w, self.h, path.display());
        Ok(())
    }

    fn encode_png<W: Write>(&self, out: W) -> image::ImageResult<()> {
        use image::codecs::png::PngEncoder;
        use image::{ExtendedColorType, ImageEncoder};

        let mut writer = BufWriter::new(out);
        let bytes = self
            .buf
            .iter()
            .flat_map(|c| c.to_bytes())
            .collect::<Vec<u8>>();
        PngEncoder::new(&mut writer).write_image(
            &bytes,
            self.w,
            self.h,
            ExtendedColorType::Rgba8,
        )?;
        writer.flush()?;
        Ok(())
    }
}

#[test]
fn new_rejects_non_positive() {
    for (w, h) in &[(0, 4), (4, -1), (-3, -3), (0, 0)] {
        match Scene::new(*w, *h) {
            Err(SceneError::InvalidDimensions { width, height }) => {
                assert_eq!((width, height), (*w, *h));
            }
            other => panic!("expected InvalidDimensions, got {:?}", other),
        }
    }
    assert!(matches!(
        Scene::new(u32::MAX as i64 + 1, 1),
        Err(SceneError::InvalidDimensions { .. })
    ));
}

#[test]
fn new_rejects_oversized() {
    for (w, h) in &[
        (u32::MAX as i64, u32::MAX as i64),
        (MAX_SIDE + 1, 1),
        (1, MAX_SIDE + 1),
        (MAX_SIDE, MAX_SIDE),
    ] {
        assert!(matches!(
            Scene::new(*w, *h),
            Err(SceneError::InvalidDimensions { .. })
        ));
    }
}

#[test]
fn new_is_transparent() {
    let scene = Scene::new(4, 4).unwrap();
    assert_eq!(scene.w(), 4);
    assert_eq!(scene.h(), 4);
    assert_eq!(scene.pixels().len(), 16);
    assert!(scene.pixels().iter().all(|c| *c == Color::TRANSPARENT));
    assert_eq!(scene.get(4, 0), None);
    assert_eq!(scene.get(0, 4), None);
}

#[test]
fn for_each_pixel_constant() {
    let mut scene = Scene::new(4, 4).unwrap();
    let c = Color::rgb(10, 20, 30);
    scene.for_each_pixel(|_, _| c);
    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(scene.get(x, y), Some(c));
        }
    }
}

#[test]
fn for_each_pixel_visits_once() {
    let (w, h) = (7u32, 3u32);
    let mut scene = Scene::new(w as i64, h as i64).unwrap();
    let mut visits = vec![0usize; (w * h) as usize];
    scene.for_each_pixel(|x, y| {
        visits[(y * w + x) as usize] += 1;
        Color::rgba(x as u8, y as u8, 0, 255)
    });
    assert!(visits.iter().all(|n| *n == 1));
    assert_eq!(scene.get(6, 2), Some(Color::rgba(6, 2, 0, 255)));
    assert_eq!(scene.get(2, 1), Some(Color::rgba(2, 1, 0, 255)));
}

#[test]
fn par_for_each_pixel_matches_sequential() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    let f = |x: u32, y: u32| Color::rgba((x * 3) as u8, (y * 5) as u8, (x ^ y) as u8, 255);
    let mut expected = Scene::new(37, 23).unwrap();
    expected.for_each_pixel(f);
    for nthread in &[0, 1, 4, 64, usize::MAX] {
        let calls = AtomicUsize::new(0);
        let mut scene = Scene::new(37, 23).unwrap();
        scene.par_for_each_pixel(*nthread, |x, y| {
            calls.fetch_add(1, Ordering::Relaxed);
            f(x, y)
        });
        assert_eq!(calls.load(Ordering::Relaxed), 37 * 23);
        assert_eq!(scene, expected);
    }
}

#[test]
fn par_for_each_pixel_single_row() {
    let mut scene = Scene::new(5, 1).unwrap();
    scene.par_for_each_pixel(usize::MAX, |x, _| Color::rgb(x as u8, 0, 0));
    assert_eq!(scene.get(4, 0), Some(Color::rgb(4, 0, 0)));
}

#[cfg(test)]
struct FullDisk;

#[cfg(test)]
impl Write for FullDisk {
    fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn encode_png_reports_write_failure() {
    let scene = Scene::new(3, 2).unwrap();
    assert!(scene.encode_png(FullDisk).is_err());
    let mut png: Vec<u8> = vec![];
    scene.encode_png(&mut png).unwrap();
    assert_eq!(&png[1..4], b"PNG");
}

#[test]
fn persist_removes_partial_file_on_encode_failure() {
    let dir = std::env::temp_dir().join(format!(
        "raytrace_seed-partial-{}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("partial.png");
    let scene = Scene::new(3, 2).unwrap();

    let result = scene.persist_with(&path, |mut file| {
        file.write_all(b"\x89PNG")?;
        scene.encode_png(FullDisk)
    });
    assert!(matches!(
        result,
        Err(SceneError::Io { .. }) | Err(SceneError::Codec(_))
    ));
    assert!(!path.exists());

    // the scene is still usable afterwards
    scene.persist(&path).unwrap();
    assert_eq!(Scene::load(&path).unwrap(), scene);
    std::fs::remove_dir_all(&dir).unwrap();
}
