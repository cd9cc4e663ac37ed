pub mod ignore_side_effect_tags;
pub mod v_html;
pub mod v_show;
pub mod v_text;
