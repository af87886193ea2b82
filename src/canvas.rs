use std::io;
use std::io::{ BufWriter, Write };
use std::fs::File;
use std::path::Path;

use crate::color::Color;

/// Longest line allowed in a PPM file.
const PPM_LINE_WIDTH: usize = 70;

/// Where a render puts its pixels.
///
/// The camera writes every pixel of its resolution exactly once, then the
/// caller flushes the sink under a name of its choosing.
pub trait ImageSink {
    /// The size of the image as `(columns, rows)`.
    fn resolution(&self) -> (usize, usize);

    fn write_pixel(&mut self, x: usize, y: usize, color: &Color);

    /// Writes the finished image out, e.g. to the file `name`.
    fn flush(&mut self, name: &str) -> io::Result<()>;
}

/// A canvas for drawing pixels.
///
/// This structure mostly stores the results of the ray tracer. Once the user
/// specifies the desired image width and height, the `Camera` generates rays
/// for each pixel and stores the resulting colors here.
///
/// Once rendering finishes, the `Canvas` can be saved to an image file. For
/// now, only plain-text PPM images are supported.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Canvas {
    /// The width of the canvas, in pixels.
    pub width: usize,

    /// The height of the canvas, in pixels.
    pub height: usize,

    /// The pixels of the canvas, stored as a flattened vector.
    pixels: Vec<Color>,
}

impl Canvas {
    /// Creates a black canvas with specified width and height.
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![Color::BLACK; width * height]
        }
    }

    /// Writes a color to a location on the `Canvas`.
    ///
    /// Out-of-bounds pixels are ignored. `x` is the column and `y` the row,
    /// both zero-indexed from the top left.
    ///
    /// # Examples
    ///
    /// ```
    /// # use phong_tracer::color::Color;
    /// # use phong_tracer::canvas::Canvas;
    /// let purple = Color::rgb(255.0, 0.0, 255.0);
    /// let mut canvas = Canvas::new(8, 8);
    /// canvas.write_pixel(4, 2, &purple);
    /// assert_eq!(canvas.read_pixel(4, 2).unwrap(), purple);
    /// ```
    pub fn write_pixel(&mut self, x: usize, y: usize, pixel: &Color) {
        if x >= self.width || y >= self.height {
            return;
        }

        self.pixels[(y * self.width) + x] = *pixel;
    }

    /// Reads a color from a location on the `Canvas`.
    ///
    /// Returns `None` for out-of-bounds pixels.
    pub fn read_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None
        }

        Some(self.pixels[(y * self.width) + x])
    }

    /// Paints every `interval`-th row and column with `color`.
    ///
    /// Handy for checking how the view plane maps onto the image. An interval
    /// of zero draws nothing.
    pub fn draw_grid(&mut self, interval: usize, color: &Color) {
        if interval == 0 {
            return;
        }

        for y in 0..self.height {
            for x in 0..self.width {
                if x % interval == 0 || y % interval == 0 {
                    self.write_pixel(x, y, color);
                }
            }
        }
    }

    /// Writes the canvas as a plain PPM (P3) image.
    ///
    /// Channels are clamped to `[0, 255]` and rounded. No line of pixel data
    /// exceeds 70 columns; values wrap onto the next line instead.
    pub fn write_ppm<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "P3")?;
        writeln!(out, "{} {}", self.width, self.height)?;
        writeln!(out, "255")?;

        let mut col = 0;
        for pixel in self.pixels.iter() {
            let p = pixel.clamped();
            for channel in &[p.r, p.g, p.b] {
                let value = (channel.round() as u8).to_string();

                if col == 0 {
                    write!(out, "{}", value)?;
                    col = value.len();
                } else if col + 1 + value.len() > PPM_LINE_WIDTH {
                    write!(out, "\n{}", value)?;
                    col = value.len();
                } else {
                    write!(out, " {}", value)?;
                    col += 1 + value.len();
                }
            }
        }

        // Terminate the PPM file with a newline
        writeln!(out)
    }

    /// Saves the canvas to a PPM file.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_ppm(&mut out)?;
        out.flush()
    }
}

impl ImageSink for Canvas {
    fn resolution(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn write_pixel(&mut self, x: usize, y: usize, color: &Color) {
        Canvas::write_pixel(self, x, y, color)
    }

    fn flush(&mut self, name: &str) -> io::Result<()> {
        self.save(Path::new(name))
    }
}

#[test]
fn new_canvas_is_black() {
    let c = Canvas::new(10, 20);

    assert_eq!(c.resolution(), (10, 20));
    for y in 0..20 {
        for x in 0..10 {
            assert!(c.read_pixel(x, y).unwrap().is_black());
        }
    }
}

#[test]
fn out_of_bounds_pixels_are_ignored() {
    let mut c = Canvas::new(2, 2);
    c.write_pixel(2, 0, &Color::WHITE);

    assert_eq!(c.read_pixel(2, 0), None);
    assert_eq!(c.read_pixel(0, 2), None);
}

#[test]
fn ppm_header_and_clamping() {
    let mut c = Canvas::new(3, 1);
    c.write_pixel(0, 0, &Color::rgb(300.0, 0.0, 0.0));
    c.write_pixel(1, 0, &Color::rgb(0.0, 127.6, 0.0));
    c.write_pixel(2, 0, &Color::rgb(-5.0, 0.0, 255.0));

    let mut out = Vec::new();
    c.write_ppm(&mut out).unwrap();

    assert_eq!(String::from_utf8(out).unwrap(),
               "P3\n3 1\n255\n255 0 0 0 128 0 0 0 255\n");
}

#[test]
fn ppm_lines_stay_short() {
    let mut c = Canvas::new(10, 2);
    for y in 0..2 {
        for x in 0..10 {
            c.write_pixel(x, y, &Color::rgb(255.0, 204.0, 153.0));
        }
    }

    let mut out = Vec::new();
    c.write_ppm(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.lines().all(|l| l.len() <= PPM_LINE_WIDTH));
    assert_eq!(text.split_whitespace().count(), 4 + 10 * 2 * 3);
    assert!(text.ends_with('\n'));
}

#[test]
fn grid_overlay() {
    let mut c = Canvas::new(5, 5);
    c.draw_grid(2, &Color::WHITE);

    assert_eq!(c.read_pixel(0, 3).unwrap(), Color::WHITE);
    assert_eq!(c.read_pixel(4, 1).unwrap(), Color::WHITE);
    assert_eq!(c.read_pixel(3, 2).unwrap(), Color::WHITE);
    assert!(c.read_pixel(1, 1).unwrap().is_black());
    assert!(c.read_pixel(3, 3).unwrap().is_black());
}
