use anyhow::Result;
use retrochip_common::App;
use retrochip_sdl2::{SdlContext, SdlInitInfo};

pub fn run(rom_data: &[u8]) -> Result<()> {
    let mut app = retrochip_chip16::EmulatorApp::default();
    app.emulator.load_rom(rom_data);
    let width = app.width();
    let height = app.height();
    let scale = app.scale();
    let title = app.title();
    let init_info = SdlInitInfo::builder()
        .width(width)
        .height(height)
        .scale(scale)
        .title(title)
        .build();
    SdlContext::run(init_info, app)?;
    Ok(())
}
