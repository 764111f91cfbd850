use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar over the display frames of one take.
pub struct TakeProgress {
    pb: ProgressBar,
}

impl TakeProgress {
    pub fn new(total_frames: u64, song: &str) -> Self {
        let pb = ProgressBar::new(total_frames);
        let style = ProgressStyle::with_template(
            "{spinner:.green} {prefix} [{bar:40.cyan/blue}] {pos}/{len} frames ({msg})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
        pb.set_style(style);
        pb.set_prefix(song.to_string());
        Self { pb }
    }

    pub fn frame(&self, samples_recorded: usize) {
        self.pb.inc(1);
        if self.pb.position() % 60 == 0 {
            self.pb.set_message(format!("{} samples", samples_recorded));
        }
    }

    pub fn finish(&self, samples_recorded: usize) {
        self.pb
            .finish_with_message(format!("{} samples", samples_recorded));
    }
}
