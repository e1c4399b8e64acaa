use std::path::Path;

use console::Style;
use porthole_core::geometry::{ViewGeometry, Viewport};

struct Styles {
    title: Style,
    label: Style,
    value: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_crop_summary(
    file: &Path,
    width: u32,
    height: u32,
    geometry: &ViewGeometry,
    viewport: Viewport,
) {
    let s = Styles::new();
    let radius = viewport.preview_radius();
    let side = (radius * 2) as f32 / geometry.zoom;

    println!();
    println!("  {}", s.title.apply_to("Porthole Crop"));
    println!("  {}", s.title.apply_to("\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}"));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(file.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Source"),
        s.value.apply_to(format!("{width}x{height}"))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Viewport"),
        s.value
            .apply_to(format!("{}x{} (radius {radius})", viewport.width, viewport.height))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Center"),
        s.value
            .apply_to(format!("({:.1}, {:.1})", geometry.center_x, geometry.center_y))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Zoom"),
        s.value.apply_to(format!("{:.4}", geometry.zoom))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Crop square"),
        s.value.apply_to(format!("{side:.0}px per side"))
    );
    println!();
}
