use glam::Mat4;
use wgpu::*;

use crate::model::{Color, Light, Material, MaterialSlots, Scene, Shape, MAX_LIGHTS};
use crate::view::mesh::{self, MeshBuffer, Vertex};
use crate::view::uniforms::{UniformBlock, UniformLayout, UniformLocation, UniformTarget, UniformValue};

pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;
pub const CLEAR_COLOR: Color = Color::RAYWHITE;
const MARKER_RADIUS: f32 = 0.2;
const MARKER_DISABLED_ALPHA: f32 = 0.3;
// keeps the grid from z-fighting with the floor
const GRID_LIFT: f32 = 0.005;

/// How a light position marker is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Solid,
    Wires,
}

/// Enabled lights get a solid marker in their color, disabled ones a faded wireframe.
pub fn marker_style(light: &Light) -> (MarkerShape, Color) {
    if light.is_enabled() {
        (MarkerShape::Solid, light.color())
    } else {
        (MarkerShape::Wires, light.color().fade(MARKER_DISABLED_ALPHA))
    }
}

/// Per-drawable uniform buffer: transform plus material.
pub struct DrawSlot {
    uniforms: UniformBlock,
    model_loc: UniformLocation,
    material_slots: MaterialSlots,
    buffer: Buffer,
    bind_group: BindGroup,
}

impl DrawSlot {
    fn new(device: &Device, layout: &BindGroupLayout, label: &str) -> Self {
        let uniforms = UniformBlock::new(UniformLayout::object());
        let model_loc = uniforms.location("model");
        let material_slots = MaterialSlots::resolve(&uniforms);
        let buffer = device.create_buffer(&BufferDescriptor {
            label: Some(label),
            size: uniforms.layout().size() as BufferAddress,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[BindGroupEntry { binding: 0, resource: buffer.as_entire_binding() }],
        });
        Self { uniforms, model_loc, material_slots, buffer, bind_group }
    }

    /// Set transform and material, upload if anything changed.
    pub fn write(&mut self, queue: &Queue, transform: Mat4, material: &Material) {
        self.uniforms.set_value(self.model_loc, UniformValue::Mat4(transform.to_cols_array()));
        material.apply(&mut self.uniforms, &self.material_slots);
        if self.uniforms.take_dirty() {
            queue.write_buffer(&self.buffer, 0, self.uniforms.as_bytes());
        }
    }
}

/// Size-dependent attachments
struct Targets {
    depth_view: TextureView,
    msaa_view: Option<TextureView>,
}

impl Targets {
    fn new(device: &Device, format: TextureFormat, sample_count: u32, width: u32, height: u32) -> Self {
        let size = Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 };
        let depth_view = device
            .create_texture(&TextureDescriptor {
                label: Some("depth_texture"),
                size,
                mip_level_count: 1,
                sample_count,
                dimension: TextureDimension::D2,
                format: DEPTH_FORMAT,
                usage: TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&TextureViewDescriptor::default());

        let msaa_view = (sample_count > 1).then(|| {
            device
                .create_texture(&TextureDescriptor {
                    label: Some("msaa_color"),
                    size,
                    mip_level_count: 1,
                    sample_count,
                    dimension: TextureDimension::D2,
                    format,
                    usage: TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&TextureViewDescriptor::default())
        });

        Self { depth_view, msaa_view }
    }
}

pub struct PipelineResources {
    pub lit: RenderPipeline,
    pub unlit: RenderPipeline,
    pub lines: RenderPipeline,
}

struct PipelineDesc<'a> {
    label: &'a str,
    shader: &'a ShaderModule,
    topology: PrimitiveTopology,
    blend: BlendState,
    depth_write: bool,
}

fn create_pipeline(
    device: &Device,
    layout: &PipelineLayout,
    format: TextureFormat,
    sample_count: u32,
    desc: PipelineDesc,
) -> RenderPipeline {
    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(layout),
        vertex: VertexState {
            module: desc.shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(FragmentState {
            module: desc.shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState { format, blend: Some(desc.blend), write_mask: ColorWrites::ALL })],
            compilation_options: Default::default(),
        }),
        primitive: PrimitiveState {
            topology: desc.topology,
            strip_index_format: None,
            front_face: FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: desc.depth_write,
            depth_compare: CompareFunction::LessEqual,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: MultisampleState { count: sample_count, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}

pub fn create_pipelines(
    device: &Device,
    format: TextureFormat,
    sample_count: u32,
    bind_group_layouts: &[&BindGroupLayout],
) -> PipelineResources {
    let lit_shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("lighting_shader"),
        source: ShaderSource::Wgsl(include_str!("shaders/lighting.wgsl").into()),
    });
    let unlit_shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("unlit_shader"),
        source: ShaderSource::Wgsl(include_str!("shaders/unlit.wgsl").into()),
    });

    let layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("pipeline_layout"),
        bind_group_layouts,
        push_constant_ranges: &[],
    });

    let pipeline = |desc| create_pipeline(device, &layout, format, sample_count, desc);
    PipelineResources {
        lit: pipeline(PipelineDesc {
            label: "lit_pipeline",
            shader: &lit_shader,
            topology: PrimitiveTopology::TriangleList,
            blend: BlendState::REPLACE,
            depth_write: true,
        }),
        unlit: pipeline(PipelineDesc {
            label: "unlit_pipeline",
            shader: &unlit_shader,
            topology: PrimitiveTopology::TriangleList,
            blend: BlendState::ALPHA_BLENDING,
            depth_write: true,
        }),
        lines: pipeline(PipelineDesc {
            label: "line_pipeline",
            shader: &unlit_shader,
            topology: PrimitiveTopology::LineList,
            blend: BlendState::ALPHA_BLENDING,
            depth_write: false,
        }),
    }
}

fn uniform_layout_entry() -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding: 0,
        visibility: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// egui output of one frame, ready to paint
pub struct UiFrame {
    pub primitives: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub pixels_per_point: f32,
}

/// Owns every GPU resource of the demo scene.
pub struct Renderer {
    pub format: TextureFormat,
    pub sample_count: u32,
    pub width: u32,
    pub height: u32,

    pipelines: PipelineResources,
    targets: Targets,

    scene_buffer: Buffer,
    scene_bind_group: BindGroup,

    floor_mesh: MeshBuffer,
    sphere_mesh: MeshBuffer,
    marker_mesh: MeshBuffer,
    marker_wire_mesh: MeshBuffer,
    grid_mesh: MeshBuffer,

    object_slots: Vec<DrawSlot>,
    marker_slots: Vec<DrawSlot>,
    grid_slot: DrawSlot,

    egui_renderer: egui_wgpu::Renderer,
}

impl Renderer {
    pub fn new(
        device: &Device,
        format: TextureFormat,
        sample_count: u32,
        width: u32,
        height: u32,
        scene: &Scene,
    ) -> Self {
        let scene_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("scene_bind_group_layout"),
            entries: &[uniform_layout_entry()],
        });
        let object_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("object_bind_group_layout"),
            entries: &[uniform_layout_entry()],
        });

        let scene_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("scene_uniforms"),
            size: scene.uniforms.layout().size() as BufferAddress,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let scene_bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("scene_bind_group"),
            layout: &scene_layout,
            entries: &[BindGroupEntry { binding: 0, resource: scene_buffer.as_entire_binding() }],
        });

        let pipelines = create_pipelines(device, format, sample_count, &[&scene_layout, &object_layout]);

        let object_slots = scene
            .objects
            .iter()
            .map(|object| DrawSlot::new(device, &object_layout, object.name))
            .collect();
        let marker_slots = (0..MAX_LIGHTS)
            .map(|slot| DrawSlot::new(device, &object_layout, &format!("light_marker_{slot}")))
            .collect();
        let grid_slot = DrawSlot::new(device, &object_layout, "grid");

        let egui_renderer = egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());

        Self {
            format,
            sample_count,
            width,
            height,
            pipelines,
            targets: Targets::new(device, format, sample_count, width, height),
            scene_buffer,
            scene_bind_group,
            floor_mesh: mesh::plane(30.0, 30.0, 3, 3).upload(device, "floor"),
            sphere_mesh: mesh::sphere(1.0, 30, 30).upload(device, "sphere"),
            marker_mesh: mesh::sphere(MARKER_RADIUS, 8, 8).upload(device, "marker"),
            marker_wire_mesh: mesh::sphere_wires(MARKER_RADIUS, 8, 8).upload(device, "marker_wires"),
            grid_mesh: mesh::grid(30, 1.0).upload(device, "grid"),
            object_slots,
            marker_slots,
            grid_slot,
            egui_renderer,
        }
    }

    pub fn resize(&mut self, device: &Device, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.targets = Targets::new(device, self.format, self.sample_count, width, height);
    }

    fn mesh_for(&self, shape: Shape) -> &MeshBuffer {
        match shape {
            Shape::Floor => &self.floor_mesh,
            Shape::Sphere => &self.sphere_mesh,
        }
    }

    /// Upload uniforms, draw the scene and the UI overlay, present.
    pub fn render(
        &mut self,
        device: &Device,
        queue: &Queue,
        surface: &Surface,
        scene: &mut Scene,
        ui: UiFrame,
    ) -> Result<(), SurfaceError> {
        if scene.uniforms.take_dirty() {
            queue.write_buffer(&self.scene_buffer, 0, scene.uniforms.as_bytes());
        }
        for (slot, object) in self.object_slots.iter_mut().zip(&scene.objects) {
            slot.write(queue, object.transform(), &object.material);
        }
        for (slot, light) in self.marker_slots.iter_mut().zip(scene.lights.iter()) {
            let (_, tint) = marker_style(light);
            slot.write(queue, Mat4::from_translation(light.position()), &Material::new(tint));
        }
        self.grid_slot.write(
            queue,
            Mat4::from_translation(glam::Vec3::Y * GRID_LIFT),
            &Material::new(Color::WHITE),
        );

        let frame = surface.get_current_texture()?;
        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor { label: Some("render_encoder") });

        {
            let (color_view, resolve_target) = match &self.targets.msaa_view {
                Some(msaa) => (msaa, Some(&view)),
                None => (&view, None),
            };
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: color_view,
                    resolve_target,
                    ops: Operations {
                        load: LoadOp::Clear(CLEAR_COLOR.to_linear_wgpu()),
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.targets.depth_view,
                    depth_ops: Some(Operations { load: LoadOp::Clear(1.0), store: StoreOp::Store }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rp.set_bind_group(0, &self.scene_bind_group, &[]);

            rp.set_pipeline(&self.pipelines.lit);
            for (slot, object) in self.object_slots.iter().zip(&scene.objects) {
                draw_mesh(&mut rp, self.mesh_for(object.shape), slot);
            }

            rp.set_pipeline(&self.pipelines.unlit);
            for (slot, light) in self.marker_slots.iter().zip(scene.lights.iter()) {
                if marker_style(light).0 == MarkerShape::Solid {
                    draw_mesh(&mut rp, &self.marker_mesh, slot);
                }
            }
            rp.set_pipeline(&self.pipelines.lines);
            for (slot, light) in self.marker_slots.iter().zip(scene.lights.iter()) {
                if marker_style(light).0 == MarkerShape::Wires {
                    draw_mesh(&mut rp, &self.marker_wire_mesh, slot);
                }
            }
            draw_mesh(&mut rp, &self.grid_mesh, &self.grid_slot);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.width, self.height],
            pixels_per_point: ui.pixels_per_point,
        };
        for (id, image_delta) in &ui.textures_delta.set {
            self.egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        let egui_commands =
            self.egui_renderer
                .update_buffers(device, queue, &mut encoder, &ui.primitives, &screen_descriptor);

        {
            let egui_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("egui_render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations { load: LoadOp::Load, store: StoreOp::Store },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.egui_renderer
                .render(&mut egui_pass.forget_lifetime(), &ui.primitives, &screen_descriptor);
        }

        for id in &ui.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        queue.submit(egui_commands.into_iter().chain(std::iter::once(encoder.finish())));
        frame.present();
        Ok(())
    }
}

fn draw_mesh(rp: &mut RenderPass, mesh: &MeshBuffer, slot: &DrawSlot) {
    rp.set_bind_group(1, &slot.bind_group, &[]);
    rp.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
    rp.set_index_buffer(mesh.index_buffer.slice(..), IndexFormat::Uint32);
    rp.draw_indexed(0..mesh.index_count, 0, 0..1);
}
