use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};

use crate::render::{RenderCtx, RenderTarget};
use crate::scene::shapes::TextCmd;
use crate::scene::{DrawCmd, DrawList};
use crate::text::{FontId, FontSystem};

use super::common::{
    create_viewport_ubo, instanced_quad_pipeline, viewport_ubo_layout_entry, InstanceBuffer,
    UnitQuad, ViewportUniform, QUAD_INDEX_COUNT,
};

/// Frames a label may go unused before its texture is released.
const LABEL_TTL_FRAMES: u64 = 120;

/// Largest label texture edge, in physical pixels.
const MAX_LABEL_EDGE: u32 = 4096;

// ── label cache ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LabelKey {
    text: String,
    font: FontId,
    /// Physical pixel size in quarter-pixel steps.
    quarter_px: u32,
}

struct Label {
    bind_group: wgpu::BindGroup,
    /// Top-left of the bitmap relative to the text origin, physical pixels.
    offset: [f32; 2],
    /// Bitmap size, physical pixels.
    size: [f32; 2],
    last_used: u64,
}

/// CPU-side coverage bitmap for one line of text.
struct LabelBitmap {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    offset: [f32; 2],
}

// ── renderer ──────────────────────────────────────────────────────────────

/// Renderer for `DrawCmd::Text`.
///
/// Overlay text in a particle scene is a handful of static labels, so each
/// distinct `(text, font, size)` is laid out once with fontdue, composited
/// into its own R8 coverage texture, and drawn afterwards as a single quad.
/// Labels are rasterized at the window scale factor and released after
/// going unused for a while.
pub struct TextRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    viewport_ubo: Option<wgpu::Buffer>,
    sampler: Option<wgpu::Sampler>,

    quad: Option<UnitQuad>,
    instances: InstanceBuffer,

    labels: HashMap<LabelKey, Label>,
    frame: u64,

    layout: Layout<()>,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            pipeline_format: None,
            pipeline: None,
            bind_group_layout: None,
            viewport_ubo: None,
            sampler: None,
            quad: None,
            instances: InstanceBuffer::default(),
            labels: HashMap::new(),
            frame: 0,
            layout: Layout::new(CoordinateSystem::PositiveYDown),
        }
    }
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders all `DrawCmd::Text` entries in `draw_list`.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        draw_list: &mut DrawList,
        font_system: &FontSystem,
    ) {
        self.frame = self.frame.wrapping_add(1);

        let text_cmds: Vec<TextCmd> = draw_list
            .iter_in_paint_order()
            .filter_map(|item| match &item.cmd {
                DrawCmd::Text(cmd) if !cmd.text.is_empty() => Some(cmd.clone()),
                _ => None,
            })
            .collect();

        if text_cmds.is_empty() {
            self.evict_stale();
            return;
        }

        self.ensure_pipeline(ctx);

        let scale = ctx.scale_factor.max(0.01);
        let mut draws: Vec<(LabelKey, GlyphQuad)> = Vec::with_capacity(text_cmds.len());

        for cmd in &text_cmds {
            let key = LabelKey {
                text: cmd.text.clone(),
                font: cmd.font,
                quarter_px: (cmd.size * scale * 4.0).round().max(1.0) as u32,
            };

            if !self.labels.contains_key(&key) {
                let Some(font) = font_system.get(cmd.font) else {
                    log::warn!("TextRenderer: unknown FontId {:?}, skipping", cmd.font);
                    continue;
                };
                let px = key.quarter_px as f32 / 4.0;
                let Some(bitmap) = self.rasterize(font, &cmd.text, px) else { continue };
                let Some(label) = self.upload_label(ctx, &bitmap) else { continue };
                log::debug!("rasterized label {:?} ({}×{} px)", cmd.text, bitmap.width, bitmap.height);
                self.labels.insert(key.clone(), label);
            }

            let Some(label) = self.labels.get_mut(&key) else { continue };
            label.last_used = self.frame;

            let min = [
                cmd.origin.x + label.offset[0] / scale,
                cmd.origin.y + label.offset[1] / scale,
            ];
            let max = [min[0] + label.size[0] / scale, min[1] + label.size[1] / scale];
            draws.push((key, GlyphQuad { dst_min: min, dst_max: max, color: cmd.color.to_array() }));
        }

        self.evict_stale();

        if draws.is_empty() {
            return;
        }

        let quad = self
            .quad
            .get_or_insert_with(|| UnitQuad::new(ctx.device, "tinsel text quad"));

        let Some(ubo) = self.viewport_ubo.as_ref() else { return };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&ViewportUniform::from_viewport(ctx.viewport)));

        let raw: Vec<GlyphQuad> = draws.iter().map(|(_, q)| *q).collect();
        let Some(instance_vbo) =
            self.instances.upload(ctx.device, ctx.queue, "tinsel text instances", &raw)
        else {
            return;
        };
        let Some(pipeline) = self.pipeline.as_ref() else { return };

        let mut rpass = target.load_pass("tinsel text pass");
        rpass.set_pipeline(pipeline);
        rpass.set_vertex_buffer(0, quad.vbo.slice(..));
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));
        rpass.set_index_buffer(quad.ibo.slice(..), wgpu::IndexFormat::Uint16);

        // One texture per label, so one draw per label.
        for (i, (key, _)) in draws.iter().enumerate() {
            let Some(label) = self.labels.get(key) else { continue };
            let i = i as u32;
            rpass.set_bind_group(0, &label.bind_group, &[]);
            rpass.draw_indexed(0..QUAD_INDEX_COUNT, 0, i..i + 1);
        }
    }

    // ── label helpers ──────────────────────────────────────────────────────

    /// Lays out one line at `px` and composites glyph coverage into a bitmap.
    fn rasterize(&mut self, font: &fontdue::Font, text: &str, px: f32) -> Option<LabelBitmap> {
        self.layout.reset(&LayoutSettings::default());
        self.layout.append(&[font], &TextStyle::new(text, px, 0));

        let glyphs: Vec<_> = self
            .layout
            .glyphs()
            .iter()
            .filter(|g| g.char_data.rasterize() && g.width > 0 && g.height > 0)
            .map(|g| (g.key, g.x.floor() as i32, g.y.floor() as i32, g.width as i32, g.height as i32))
            .collect();

        let min_x = glyphs.iter().map(|g| g.1).min()?;
        let min_y = glyphs.iter().map(|g| g.2).min()?;
        let max_x = glyphs.iter().map(|g| g.1 + g.3).max()?;
        let max_y = glyphs.iter().map(|g| g.2 + g.4).max()?;

        let width = (max_x - min_x) as u32;
        let height = (max_y - min_y) as u32;
        if width == 0 || height == 0 || width > MAX_LABEL_EDGE || height > MAX_LABEL_EDGE {
            log::warn!("TextRenderer: label {text:?} has unusable size {width}×{height}, skipping");
            return None;
        }

        let mut pixels = vec![0u8; (width * height) as usize];
        for (key, gx, gy, gw, gh) in glyphs {
            let (_, coverage) = font.rasterize_config(key);
            let ox = (gx - min_x) as usize;
            let oy = (gy - min_y) as usize;
            for row in 0..gh as usize {
                let dst = (oy + row) * width as usize + ox;
                let src = row * gw as usize;
                for col in 0..gw as usize {
                    let (Some(&c), Some(d)) = (coverage.get(src + col), pixels.get_mut(dst + col))
                    else {
                        continue;
                    };
                    // Overlapping glyphs (kerning, italics) keep the stronger coverage.
                    *d = (*d).max(c);
                }
            }
        }

        Some(LabelBitmap {
            pixels,
            width,
            height,
            offset: [min_x as f32, min_y as f32],
        })
    }

    fn upload_label(&self, ctx: &RenderCtx<'_>, bitmap: &LabelBitmap) -> Option<Label> {
        let bgl = self.bind_group_layout.as_ref()?;
        let ubo = self.viewport_ubo.as_ref()?;
        let sampler = self.sampler.as_ref()?;

        let extent = wgpu::Extent3d {
            width: bitmap.width,
            height: bitmap.height,
            depth_or_array_layers: 1,
        };
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("tinsel text label"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &bitmap.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bitmap.width),
                rows_per_image: Some(bitmap.height),
            },
            extent,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tinsel text label bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        Some(Label {
            bind_group,
            offset: bitmap.offset,
            size: [bitmap.width as f32, bitmap.height as f32],
            last_used: self.frame,
        })
    }

    fn evict_stale(&mut self) {
        let frame = self.frame;
        self.labels
            .retain(|_, label| frame.wrapping_sub(label.last_used) <= LABEL_TTL_FRAMES);
    }

    // ── lazy-init helpers ──────────────────────────────────────────────────

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tinsel text shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/text.wgsl").into()),
        });

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tinsel text bgl"),
            entries: &[
                viewport_ubo_layout_entry(),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline = instanced_quad_pipeline(
            ctx.device,
            ctx.surface_format,
            "tinsel text pipeline",
            &shader,
            &bgl,
            GlyphQuad::layout(),
        );

        self.sampler = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("tinsel text sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        }));
        self.viewport_ubo = Some(create_viewport_ubo(ctx.device, "tinsel text viewport ubo"));
        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bgl);
        // Cached bind groups reference the old layout.
        self.labels.clear();
    }
}

// ── GPU types ─────────────────────────────────────────────────────────────

/// Instance data layout (32 bytes):
///
///  offset  0  dst_min  [f32; 2]   loc 1
///  offset  8  dst_max  [f32; 2]   loc 2
///  offset 16  color    [f32; 4]   loc 3  (premultiplied)
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct GlyphQuad {
    dst_min: [f32; 2],
    dst_max: [f32; 2],
    color: [f32; 4],
}

impl GlyphQuad {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        1 => Float32x2, // dst_min
        2 => Float32x2, // dst_max
        3 => Float32x4  // color
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GlyphQuad>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}
