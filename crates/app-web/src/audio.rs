use app_core::{AnalyzerConfig, SpectrumSource, VizError};
use web_sys as web;

/// `<audio>` element → analyser → speakers. Built once, on the first play.
pub struct AudioGraph {
    pub ctx: web::AudioContext,
    pub analyser: web::AnalyserNode,
    _source: web::MediaElementAudioSourceNode,
}

impl AudioGraph {
    pub fn new(audio: &web::HtmlAudioElement) -> anyhow::Result<Self> {
        let ctx = web::AudioContext::new()
            .map_err(|e| anyhow::anyhow!("AudioContext error: {e:?}"))?;
        match Self::connect(&ctx, audio) {
            Ok((analyser, source)) => {
                log::info!("[audio] graph ready: sample_rate={}", ctx.sample_rate());
                Ok(Self {
                    ctx,
                    analyser,
                    _source: source,
                })
            }
            Err(e) => {
                let _ = ctx.close();
                Err(e)
            }
        }
    }

    // The element source comes last: an element accepts only one source node
    // for its whole life, so nothing may fail once it exists.
    fn connect(
        ctx: &web::AudioContext,
        audio: &web::HtmlAudioElement,
    ) -> anyhow::Result<(web::AnalyserNode, web::MediaElementAudioSourceNode)> {
        let analyser = web::AnalyserNode::new(ctx)
            .map_err(|e| anyhow::anyhow!("AnalyserNode error: {e:?}"))?;
        analyser
            .connect_with_audio_node(&ctx.destination())
            .map_err(|e| anyhow::anyhow!("connect analyser: {e:?}"))?;
        let source = ctx
            .create_media_element_source(audio)
            .map_err(|e| anyhow::anyhow!("MediaElementSource error: {e:?}"))?;
        source
            .connect_with_audio_node(&analyser)
            .map_err(|e| anyhow::anyhow!("connect source: {e:?}"))?;
        Ok((analyser, source))
    }

    pub fn resume(&self) {
        if let Err(e) = self.ctx.resume() {
            log::warn!("[audio] resume failed: {e:?}");
        }
    }

    pub fn close(&self) {
        let _ = self.analyser.disconnect();
        if let Err(e) = self.ctx.close() {
            log::warn!("[audio] close failed: {e:?}");
        }
    }
}

/// Byte-frequency data straight from a WebAudio analyser.
pub struct AnalyserSpectrum {
    node: web::AnalyserNode,
}

impl AnalyserSpectrum {
    pub fn new(node: web::AnalyserNode) -> Self {
        Self { node }
    }
}

impl SpectrumSource for AnalyserSpectrum {
    fn configure(&mut self, config: &AnalyzerConfig) -> Result<(), VizError> {
        self.node.set_fft_size(config.fft_size as u32);
        // max before min: the node rejects a min above the current max
        self.node.set_max_decibels(config.max_decibels as f64);
        self.node.set_min_decibels(config.min_decibels as f64);
        self.node.set_smoothing_time_constant(config.smoothing as f64);
        Ok(())
    }

    fn read_bytes(&mut self, out: &mut [u8]) {
        self.node.get_byte_frequency_data(out);
    }
}
