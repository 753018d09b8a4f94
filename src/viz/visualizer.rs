use std::path::Path;

use image::{imageops, ImageFormat, Rgb, RgbImage};
use tracing::info;

use crate::error::Result;
use crate::math::Tensor;
use crate::viz::convert::tensor_to_rgb;

/// Inference results for one held-out sample pair. Discriminator outputs
/// are raw logits.
#[derive(Debug)]
pub struct SamplePanel<'a> {
    pub sample_clear: &'a Tensor,
    pub prediction_clear2fog: &'a Tensor,
    pub sample_fog: &'a Tensor,
    pub prediction_fog2clear: &'a Tensor,
    /// `discriminator_clear(sample_clear)`
    pub disc_clear_real: &'a Tensor,
    /// `discriminator_fog(sample_fog)`
    pub disc_fog_real: &'a Tensor,
    /// `discriminator_clear(prediction_fog2clear)`
    pub disc_clear_fake: &'a Tensor,
    /// `discriminator_fog(prediction_clear2fog)`
    pub disc_fog_fake: &'a Tensor,
}

/// Renders, displays and stores sample panels for the epoch callback.
pub trait Visualizer {
    /// Generator outputs next to the discriminator verdicts on real and
    /// generated images.
    fn render_gen_and_disc(&mut self, panel: &SamplePanel) -> Result<RgbImage>;

    /// Inputs next to their translations.
    fn render_generators(&mut self, panel: &SamplePanel) -> Result<RgbImage>;

    fn show(&mut self, title: &str, image: &RgbImage) -> Result<()>;

    fn save(&mut self, image: &RgbImage, path: &Path) -> Result<()> {
        image.save_with_format(path, ImageFormat::Jpeg)?;
        Ok(())
    }
}

/// Default visualizer: tiles the first item of every tensor into a grid.
/// Discriminator scores become gray tiles at `sigmoid(mean logit)`, white
/// meaning "real". `show` has no window to draw into and only logs.
#[derive(Debug, Clone)]
pub struct GridVisualizer {
    pub normalized_input: bool,
    /// Integer upscale applied to every tile.
    pub scale: u32,
}

impl GridVisualizer {
    pub fn new(normalized_input: bool) -> Self {
        GridVisualizer { normalized_input, scale: 4 }
    }

    fn tile(&self, images: &Tensor) -> Result<RgbImage> {
        let img = tensor_to_rgb(images, 0, self.normalized_input)?;
        Ok(self.upscale(&img))
    }

    fn score_tile(&self, logits: &Tensor, width: u32, height: u32) -> Result<RgbImage> {
        let first = logits.batch_item(0)?;
        let score = 1.0 / (1.0 + (-first.mean()).exp());
        let level = (score * 255.0).round() as u8;
        Ok(RgbImage::from_pixel(width, height, Rgb([level; 3])))
    }

    fn upscale(&self, img: &RgbImage) -> RgbImage {
        if self.scale <= 1 {
            return img.clone();
        }
        imageops::resize(img, img.width() * self.scale, img.height() * self.scale, imageops::FilterType::Nearest)
    }

    /// Lays equally sized tiles out row by row.
    fn grid(rows: Vec<Vec<RgbImage>>) -> RgbImage {
        let tile_w = rows.iter().flatten().map(RgbImage::width).max().unwrap_or(0);
        let tile_h = rows.iter().flatten().map(RgbImage::height).max().unwrap_or(0);
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0) as u32;
        let mut canvas = RgbImage::new(tile_w * cols, tile_h * rows.len() as u32);
        for (r, row) in rows.iter().enumerate() {
            for (c, tile) in row.iter().enumerate() {
                imageops::overlay(&mut canvas, tile, (c as u32 * tile_w) as i64, (r as u32 * tile_h) as i64);
            }
        }
        canvas
    }
}

impl Visualizer for GridVisualizer {
    fn render_gen_and_disc(&mut self, panel: &SamplePanel) -> Result<RgbImage> {
        let clear = self.tile(panel.sample_clear)?;
        let (w, h) = clear.dimensions();
        let rows = vec![
            vec![
                clear,
                self.score_tile(panel.disc_clear_real, w, h)?,
                self.tile(panel.prediction_clear2fog)?,
                self.score_tile(panel.disc_fog_fake, w, h)?,
            ],
            vec![
                self.tile(panel.sample_fog)?,
                self.score_tile(panel.disc_fog_real, w, h)?,
                self.tile(panel.prediction_fog2clear)?,
                self.score_tile(panel.disc_clear_fake, w, h)?,
            ],
        ];
        Ok(GridVisualizer::grid(rows))
    }

    fn render_generators(&mut self, panel: &SamplePanel) -> Result<RgbImage> {
        let rows = vec![
            vec![self.tile(panel.sample_clear)?, self.tile(panel.prediction_clear2fog)?],
            vec![self.tile(panel.sample_fog)?, self.tile(panel.prediction_fog2clear)?],
        ];
        Ok(GridVisualizer::grid(rows))
    }

    fn show(&mut self, title: &str, image: &RgbImage) -> Result<()> {
        info!("{} ({}x{})", title, image.width(), image.height());
        Ok(())
    }
}
