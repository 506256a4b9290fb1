use egui::Context;

use crate::config::Variant;
use crate::model::{Color, Scene};

/// Build the overlay (and, for the interactive demo, the settings window)
pub fn build_ui(
    egui_ctx: &Context,
    raw_input: egui::RawInput,
    scene: &mut Scene,
    variant: Variant,
    fps: f32,
) -> egui::FullOutput {
    egui_ctx.run(raw_input, |ctx| {
        draw_overlay(ctx, variant, fps, scene.cursor_captured);
        if variant.has_gui() {
            draw_settings_window(ctx, scene);
        }
    })
}

fn draw_overlay(ctx: &Context, variant: Variant, fps: f32, cursor_captured: bool) {
    egui::Area::new(egui::Id::new("overlay"))
        .fixed_pos([10.0, 10.0])
        .interactable(false)
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(format!("{fps:.0} FPS"))
                    .size(20.0)
                    .color(Color::LIME.to_egui()),
            );
            ui.add_space(6.0);
            let help = egui::RichText::new("R, B to toggle lights").size(20.0).color(Color::DARKGRAY.to_egui());
            ui.label(help);
            if variant.has_movable_light() {
                ui.label(egui::RichText::new("H, J, K, L to move the blue light").color(Color::DARKGRAY.to_egui()));
            }
            if variant.has_cursor_toggle() {
                let mode = if cursor_captured { "camera" } else { "UI" };
                ui.label(
                    egui::RichText::new(format!("Left Alt to switch mouse mode (now: {mode})"))
                        .color(Color::DARKGRAY.to_egui()),
                );
            }
        });
}

fn draw_settings_window(ctx: &Context, scene: &mut Scene) {
    egui::Window::new("Lighting")
        .default_pos([ctx.available_rect().width() - 260.0, 10.0])
        .default_width(240.0)
        .show(ctx, |ui| {
            ui.add(egui::Slider::new(&mut scene.ambient_factor, 0.0..=1.0).text("Ambient"));
            ui.add(egui::Slider::new(&mut scene.smoothness, 1.0..=100.0).text("Smoothness"));
            ui.separator();

            for (slot, color) in scene.palette.iter_mut().enumerate() {
                ui.horizontal(|ui| {
                    let mut rgba = color.to_array();
                    if ui.color_edit_button_srgba_unmultiplied(&mut rgba).changed() {
                        *color = Color::from_array(rgba);
                    }
                    ui.label(format!("Light {slot}"));
                });
            }

            egui::CollapsingHeader::new("Materials").show(ui, |ui| {
                for object in scene.objects.iter_mut() {
                    ui.label(egui::RichText::new(object.name).small());
                    ui.add(egui::Slider::new(&mut object.material.diffuse_factor, 0.0..=2.0).text("Diffuse"));
                    ui.add(egui::Slider::new(&mut object.material.specular_factor, 0.0..=2.0).text("Specular"));
                }
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DemoConfig;

    #[test]
    fn settings_window_leaves_state_alone_without_input() {
        let ctx = Context::default();
        let mut scene = Scene::new(&DemoConfig::interactive(), 1500, 900);

        for _ in 0..2 {
            build_ui(&ctx, egui::RawInput::default(), &mut scene, Variant::Interactive, 60.0);
        }

        assert_eq!(scene.ambient_factor, 0.1);
        assert_eq!(scene.palette, [Color::BLUE, Color::RED]);
    }

    #[test]
    fn basic_overlay_builds() {
        let ctx = Context::default();
        let mut scene = Scene::new(&DemoConfig::basic(), 1500, 900);
        let output = build_ui(&ctx, egui::RawInput::default(), &mut scene, Variant::Basic, 60.0);
        assert!(output.textures_delta.free.is_empty());
        assert!(scene.lights.iter().all(|l| l.is_enabled()));
    }
}
