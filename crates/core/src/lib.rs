pub mod shared {
    pub mod constants;
    pub mod error;
    pub mod frame;
    pub mod region;
    pub mod video_metadata;
}

pub mod regions {
    pub mod authoring;
    pub mod persistence;
    pub mod region_store;
}

pub mod compositing {
    pub mod domain {
        pub mod frame_compositor;
        pub mod strength_curve;
    }
    pub mod infrastructure;
}

pub mod video {
    pub mod domain {
        pub mod animation_writer;
        pub mod image_writer;
        pub mod video_sink;
        pub mod video_source;
    }
    pub mod infrastructure {
        pub mod ffmpeg_sink;
        pub mod ffmpeg_source;
        pub mod gif_file_writer;
        pub mod image_file_writer;
    }
}

pub mod animation {
    pub mod animated_exporter;
    pub mod sampling_plan;
}

pub mod pipeline {
    pub mod engine;
    pub mod export_animation_use_case;
    pub mod export_video_use_case;
    pub mod preview_frame_use_case;
    pub mod video_info_use_case;
}

#[cfg(test)]
mod test_support;
