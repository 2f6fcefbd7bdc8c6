use bytemuck::{Pod, Zeroable};

use crate::render::{RenderCtx, RenderTarget};
use crate::scene::{DrawCmd, DrawList};

use super::common::{
    create_viewport_ubo, instanced_quad_pipeline, viewport_ubo_layout_entry, InstanceBuffer,
    UnitQuad, ViewportUniform, QUAD_INDEX_COUNT,
};

/// Renderer for `DrawCmd::Circle`.
///
/// Every circle in the list becomes one instance of a shared unit quad; the
/// fragment shader cuts the disc out with a one-pixel antialiased edge. All
/// instances go out in a single draw call, in paint order, so a depth-sorted
/// list composites back-to-front.
///
/// One renderer owns one instance buffer. Drawing two lists in the same frame
/// needs two renderers, because queued buffer writes all land before the
/// frame's command buffer executes.
#[derive(Default)]
pub struct CircleRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group: Option<wgpu::BindGroup>,
    viewport_ubo: Option<wgpu::Buffer>,

    quad: Option<UnitQuad>,
    instances: InstanceBuffer,

    // Reused between frames; the scene pushes tens of thousands of circles.
    scratch: Vec<CircleInstance>,
}

impl CircleRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        draw_list: &mut DrawList,
    ) {
        self.scratch.clear();
        for item in draw_list.iter_in_paint_order() {
            let DrawCmd::Circle(cmd) = &item.cmd else { continue };
            if cmd.radius <= 0.0 || cmd.color.a <= 0.0 {
                continue;
            }
            self.scratch.push(CircleInstance {
                center: [cmd.center.x, cmd.center.y],
                radius: [cmd.radius, 0.0],
                color: cmd.color.to_array(),
            });
        }

        if self.scratch.is_empty() {
            return;
        }

        self.ensure_pipeline(ctx);
        let quad = self
            .quad
            .get_or_insert_with(|| UnitQuad::new(ctx.device, "tinsel circle quad"));

        let Some(ubo) = self.viewport_ubo.as_ref() else { return };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&ViewportUniform::from_viewport(ctx.viewport)));

        let count = self.scratch.len() as u32;
        let Some(instance_vbo) =
            self.instances.upload(ctx.device, ctx.queue, "tinsel circle instances", &self.scratch)
        else {
            return;
        };

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(bind_group) = self.bind_group.as_ref() else { return };

        let mut rpass = target.load_pass("tinsel circle pass");
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, quad.vbo.slice(..));
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));
        rpass.set_index_buffer(quad.ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..QUAD_INDEX_COUNT, 0, 0..count);
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tinsel circle shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/circle.wgsl").into()),
        });

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tinsel circle bgl"),
            entries: &[viewport_ubo_layout_entry()],
        });

        let pipeline = instanced_quad_pipeline(
            ctx.device,
            ctx.surface_format,
            "tinsel circle pipeline",
            &shader,
            &bgl,
            CircleInstance::layout(),
        );

        let viewport_ubo = create_viewport_ubo(ctx.device, "tinsel circle viewport ubo");
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tinsel circle bind group"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_ubo.as_entire_binding(),
            }],
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.viewport_ubo = Some(viewport_ubo);
        self.bind_group = Some(bind_group);
    }
}

// ── GPU types ─────────────────────────────────────────────────────────────

/// Instance data layout (32 bytes):
///
///  offset  0  center  [f32; 2]   loc 1
///  offset  8  radius  [f32; 2]   loc 2  (.x = radius, .y unused)
///  offset 16  color   [f32; 4]   loc 3  (premultiplied)
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct CircleInstance {
    center: [f32; 2],
    radius: [f32; 2],
    color: [f32; 4],
}

impl CircleInstance {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        1 => Float32x2, // center
        2 => Float32x2, // radius
        3 => Float32x4  // color
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CircleInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}
