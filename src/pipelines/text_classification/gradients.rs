use burn::{
    module::{Module, ModuleVisitor, ParamId},
    optim::GradientsParams,
    tensor::{
        backend::{AutodiffBackend, Backend},
        ElementConversion, Tensor,
    },
};

use crate::models::text_cnn::Model;

/// Field names of a layer's float parameters, in the order the layer visits them
const LAYER_PARAMS: [&str; 2] = ["weight", "bias"];

/// Summary of the gradient of one parameter
#[derive(Clone, Debug, PartialEq)]
pub struct GradientStats {
    /// Parameter path, e.g. `convolutions.0/weight`
    pub name: String,

    /// Fraction of gradient entries that are exactly zero
    pub sparsity: f64,

    /// Smallest gradient entry
    pub min: f64,

    /// Largest gradient entry
    pub max: f64,

    /// Mean gradient entry
    pub mean: f64,
}

impl GradientStats {
    fn from_tensor<B: Backend, const D: usize>(
        name: String,
        grad: Tensor<B, D>,
    ) -> Self {
        let elements = grad.shape().num_elements();

        let zeros = grad
            .clone()
            .equal_elem(0.0)
            .int()
            .sum()
            .into_scalar()
            .elem::<f64>();

        Self {
            name,
            sparsity: if elements == 0 {
                0.0
            } else {
                zeros / elements as f64
            },
            min: grad.clone().min().into_scalar().elem::<f64>(),
            max: grad.clone().max().into_scalar().elem::<f64>(),
            mean: grad.mean().into_scalar().elem::<f64>(),
        }
    }
}

struct Collector<'a> {
    grads: &'a GradientsParams,
    layer: String,
    visited: usize,
    stats: Vec<GradientStats>,
}

impl<'a> Collector<'a> {
    fn layer<B: AutodiffBackend, M: Module<B>>(&mut self, name: String, module: &M) {
        self.layer = name;
        self.visited = 0;

        module.visit(self);
    }
}

impl<'a, B: AutodiffBackend> ModuleVisitor<B> for Collector<'a> {
    fn visit_float<const D: usize>(&mut self, id: &ParamId, _tensor: &Tensor<B, D>) {
        let param = LAYER_PARAMS.get(self.visited).copied().unwrap_or("param");
        self.visited += 1;

        if let Some(grad) = self.grads.get::<B::InnerBackend, D>(id) {
            let name = format!("{}/{}", self.layer, param);
            self.stats.push(GradientStats::from_tensor(name, grad));
        }
    }
}

/// Gradient statistics for every trainable parameter of the model
pub fn gradient_stats<B: AutodiffBackend>(
    model: &Model<B>,
    grads: &GradientsParams,
) -> Vec<GradientStats> {
    let mut collector = Collector {
        grads,
        layer: String::new(),
        visited: 0,
        stats: Vec::new(),
    };

    collector.layer::<B, _>("embedding".to_string(), &model.embedding);

    for (index, conv) in model.convolutions.iter().enumerate() {
        collector.layer::<B, _>(format!("convolutions.{index}"), conv);
    }

    collector.layer::<B, _>("output".to_string(), &model.output);

    collector.stats
}
