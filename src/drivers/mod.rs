// Hardware drivers, chip-level and board-independent.
//
// Register offsets live in lcdc::regmap per controller generation; which
// generation, panel and backlight a board has is decided in board/.

pub mod backlight;
pub mod lcdc;
